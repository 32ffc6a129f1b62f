use gg_core::config::FitMode;
use gg_core::error::CoreError;
use gg_core::numeric::round_half_up;

/// Default grid width when nothing else constrains it.
pub const DEFAULT_WIDTH: u32 = 78;

/// Width solved from height: terminal cells are about twice as tall as wide.
const WIDTH_CORRECTION: f32 = 2.0;
/// Height solved from width.
const HEIGHT_CORRECTION: f32 = 0.5;

/// Inputs of the dimension planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanRequest {
    /// Stored source width, in pixels.
    pub source_width: u32,
    /// Stored source height, in pixels.
    pub source_height: u32,
    /// Orientation rotates by a quarter turn.
    pub switch_axes: bool,
    /// Terminal width, in cells.
    pub term_width: u32,
    /// Terminal height, in cells.
    pub term_height: u32,
    /// Explicit width.
    pub width: Option<u32>,
    /// Explicit height.
    pub height: Option<u32>,
    /// Terminal fitting.
    pub fit: FitMode,
    /// Border around the grid (one cell on each side).
    pub border: bool,
}

/// Planned grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimensionPlan {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
    /// Width was derived from the aspect ratio.
    pub auto_width: bool,
    /// Height was derived from the aspect ratio.
    pub auto_height: bool,
    /// Terminal width used for the fit adjustment.
    pub term_width: u32,
}

/// Width for `height` rows of a `sw × sh` image.
#[inline(always)]
fn calc_width(height: u32, sw: f32, sh: f32) -> u32 {
    round_half_up(WIDTH_CORRECTION * height as f32 * sw / sh).max(0) as u32
}

/// Height for `width` columns of a `sw × sh` image.
#[inline(always)]
fn calc_height(width: u32, sw: f32, sh: f32) -> u32 {
    round_half_up(HEIGHT_CORRECTION * width as f32 * sh / sw).max(0) as u32
}

/// Solve the grid dimensions.
///
/// One dimension is fixed (explicit, terminal-derived or the 78-column
/// default) and the other follows from the display aspect ratio.
///
/// # Errors
/// [`CoreError::InvalidDimensions`] for an empty source,
/// [`CoreError::DegenerateDimension`] when the grid would be empty, which
/// callers treat as "skip this image".
///
/// # Example
/// ```
/// use gg_ascii::dimensions::{plan, PlanRequest};
/// use gg_core::config::FitMode;
/// let req = PlanRequest {
///     source_width: 640, source_height: 480, switch_axes: false,
///     term_width: 80, term_height: 25,
///     width: None, height: None, fit: FitMode::Off, border: false,
/// };
/// let p = plan(&req).unwrap();
/// assert_eq!((p.width, p.height), (78, 29));
/// ```
pub fn plan(req: &PlanRequest) -> Result<DimensionPlan, CoreError> {
    if req.source_width == 0 || req.source_height == 0 {
        return Err(CoreError::InvalidDimensions {
            width: req.source_width,
            height: req.source_height,
        });
    }
    let (sw, sh) = if req.switch_axes {
        (req.source_height, req.source_width)
    } else {
        (req.source_width, req.source_height)
    };
    let (swf, shf) = (sw as f32, sh as f32);
    let border = if req.border { 2 } else { 0 };

    let (mut width, mut height, mut auto_width, mut auto_height) = match (req.width, req.height) {
        (Some(w), Some(h)) => (w, h, false, false),
        (Some(w), None) => (w, 0, false, true),
        (None, Some(h)) => (0, h, true, false),
        (None, None) => match req.fit {
            FitMode::Off => (DEFAULT_WIDTH, 0, false, true),
            FitMode::Width => (req.term_width.saturating_sub(border), 0, false, true),
            FitMode::Height | FitMode::Auto => {
                (0, req.term_height.saturating_sub(border), true, false)
            }
        },
    };

    if auto_width && !auto_height {
        width = calc_width(height, swf, shf);
        while width == 0 {
            height += 1;
            width = calc_width(height, swf, shf);
        }
        if req.fit == FitMode::Auto && width + border > req.term_width {
            log::debug!(
                "largeur {width} hors terminal ({}), ajustement",
                req.term_width
            );
            width = req.term_width.saturating_sub(border);
            height = 0;
            auto_width = false;
            auto_height = true;
        }
    }

    if !auto_width && auto_height {
        height = calc_height(width, swf, shf);
        if height == 0 {
            height = u32::from(sh != 1);
        }
    }

    if width == 0 || height == 0 {
        return Err(CoreError::DegenerateDimension { width, height });
    }

    Ok(DimensionPlan {
        width,
        height,
        auto_width,
        auto_height,
        term_width: req.term_width,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sw: u32, sh: u32) -> PlanRequest {
        PlanRequest {
            source_width: sw,
            source_height: sh,
            switch_axes: false,
            term_width: 80,
            term_height: 25,
            width: None,
            height: None,
            fit: FitMode::Off,
            border: false,
        }
    }

    #[test]
    fn default_width_solves_height() {
        let p = plan(&request(100, 100)).unwrap();
        assert_eq!((p.width, p.height), (78, 39));
        assert!(p.auto_height && !p.auto_width);
    }

    #[test]
    fn explicit_dimensions_are_kept() {
        let p = plan(&PlanRequest {
            width: Some(10),
            height: Some(3),
            ..request(100, 100)
        })
        .unwrap();
        assert_eq!((p.width, p.height), (10, 3));
    }

    #[test]
    fn width_then_height_round_trips() {
        for sw in [100, 200, 300, 400] {
            for h in 5..40 {
                let w = plan(&PlanRequest {
                    height: Some(h),
                    ..request(sw, 400)
                })
                .unwrap()
                .width;
                let back = plan(&PlanRequest {
                    width: Some(w),
                    ..request(sw, 400)
                })
                .unwrap()
                .height;
                assert!(back.abs_diff(h) <= 1, "{sw}x400 h={h} w={w} back={back}");
            }
        }
    }

    #[test]
    fn auto_fit_clamps_wide_images_to_the_terminal() {
        let p = plan(&PlanRequest {
            fit: FitMode::Auto,
            ..request(1000, 100)
        })
        .unwrap();
        assert_eq!((p.width, p.height), (80, 4));
        assert!(p.auto_height);
    }

    #[test]
    fn auto_fit_accounts_for_the_border() {
        let p = plan(&PlanRequest {
            fit: FitMode::Auto,
            border: true,
            ..request(1000, 100)
        })
        .unwrap();
        assert_eq!((p.width, p.height), (78, 4));
    }

    #[test]
    fn auto_fit_keeps_tall_images_at_terminal_height() {
        let p = plan(&PlanRequest {
            fit: FitMode::Auto,
            ..request(100, 100)
        })
        .unwrap();
        assert_eq!((p.width, p.height), (50, 25));
    }

    #[test]
    fn width_fit_uses_terminal_width() {
        let p = plan(&PlanRequest {
            fit: FitMode::Width,
            ..request(100, 100)
        })
        .unwrap();
        assert_eq!((p.width, p.height), (80, 40));
    }

    #[test]
    fn height_fit_uses_terminal_height_without_clamping() {
        let p = plan(&PlanRequest {
            fit: FitMode::Height,
            ..request(1000, 100)
        })
        .unwrap();
        assert_eq!((p.width, p.height), (500, 25));
        assert!(p.auto_width && !p.auto_height);
    }

    #[test]
    fn height_fit_accounts_for_the_border() {
        let p = plan(&PlanRequest {
            fit: FitMode::Height,
            border: true,
            ..request(100, 100)
        })
        .unwrap();
        assert_eq!((p.width, p.height), (46, 23));
    }

    #[test]
    fn zero_height_becomes_one_row_except_for_single_row_sources() {
        let two_rows = plan(&PlanRequest {
            width: Some(10),
            ..request(1000, 2)
        })
        .unwrap();
        assert_eq!((two_rows.width, two_rows.height), (10, 1));

        let one_row = plan(&PlanRequest {
            width: Some(10),
            ..request(1000, 1)
        });
        assert!(matches!(
            one_row,
            Err(CoreError::DegenerateDimension {
                width: 10,
                height: 0
            })
        ));
    }

    #[test]
    fn zero_width_grows_height() {
        let p = plan(&PlanRequest {
            height: Some(1),
            ..request(1, 1000)
        })
        .unwrap();
        assert_eq!((p.width, p.height), (1, 250));
    }

    #[test]
    fn one_pixel_tall_source_is_skipped() {
        let err = plan(&request(100, 1)).unwrap_err();
        assert!(matches!(err, CoreError::DegenerateDimension { height: 0, .. }));
    }

    #[test]
    fn flat_source_gets_at_least_one_row() {
        let p = plan(&request(1000, 2)).unwrap();
        assert_eq!(p.height, 1);
    }

    #[test]
    fn rotated_source_uses_display_dimensions() {
        let p = plan(&PlanRequest {
            switch_axes: true,
            ..request(200, 100)
        })
        .unwrap();
        assert_eq!(p.height, 78);
    }

    #[test]
    fn empty_source_is_invalid() {
        assert!(matches!(
            plan(&request(0, 10)),
            Err(CoreError::InvalidDimensions { .. })
        ));
    }
}
