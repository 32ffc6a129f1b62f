use serde::{Deserialize, Serialize};

/// EXIF orientation of the stored pixels relative to the upright image.
///
/// Discriminants are the EXIF tag values.
///
/// # Example
/// ```
/// use gg_core::orientation::Orientation;
/// assert_eq!(Orientation::from_exif(6), Orientation::Rotate270);
/// assert_eq!(Orientation::from_exif(0), Orientation::Horizontal);
/// assert!(Orientation::Rotate90.switches_axes());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Orientation {
    /// 1: stored upright.
    #[default]
    Horizontal = 1,
    /// 2: mirrored left/right.
    MirrorHorizontal = 2,
    /// 3: upside down.
    Rotate180 = 3,
    /// 4: mirrored top/bottom.
    MirrorVertical = 4,
    /// 5: transposed.
    MirrorHorizontalRotate90 = 5,
    /// 6: quarter turn, axes swapped.
    Rotate270 = 6,
    /// 7: transversed.
    MirrorHorizontalRotate270 = 7,
    /// 8: quarter turn the other way, axes swapped.
    Rotate90 = 8,
}

impl Orientation {
    /// All orientations, in tag order.
    pub const ALL: [Self; 8] = [
        Self::Horizontal,
        Self::MirrorHorizontal,
        Self::Rotate180,
        Self::MirrorVertical,
        Self::MirrorHorizontalRotate90,
        Self::Rotate270,
        Self::MirrorHorizontalRotate270,
        Self::Rotate90,
    ];

    /// Map an EXIF tag value. Unknown values resolve to `Horizontal`.
    #[must_use]
    pub fn from_exif(tag: u16) -> Self {
        match tag {
            2 => Self::MirrorHorizontal,
            3 => Self::Rotate180,
            4 => Self::MirrorVertical,
            5 => Self::MirrorHorizontalRotate90,
            6 => Self::Rotate270,
            7 => Self::MirrorHorizontalRotate270,
            8 => Self::Rotate90,
            _ => Self::Horizontal,
        }
    }

    /// EXIF tag value.
    #[must_use]
    pub fn exif(self) -> u16 {
        self as u16
    }

    /// Whether stored rows become displayed columns.
    #[must_use]
    pub fn switches_axes(self) -> bool {
        matches!(
            self,
            Self::MirrorHorizontalRotate90
                | Self::Rotate270
                | Self::MirrorHorizontalRotate270
                | Self::Rotate90
        )
    }

    /// Human-readable label, for verbose output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Horizontal => "Horizontal (normal)",
            Self::MirrorHorizontal => "Mirror horizontal",
            Self::Rotate180 => "Rotate 180",
            Self::MirrorVertical => "Mirror vertical",
            Self::MirrorHorizontalRotate90 => "Mirror horizontal and rotate 90",
            Self::Rotate270 => "Rotate 270",
            Self::MirrorHorizontalRotate270 => "Mirror horizontal and rotate 270",
            Self::Rotate90 => "Rotate 90",
        }
    }

    /// Fixed mirror rule: (mirror x, mirror y) before user flips.
    #[inline(always)]
    fn mirrors(self) -> (bool, bool) {
        match self {
            Self::Horizontal | Self::MirrorHorizontalRotate90 => (false, false),
            Self::MirrorHorizontal | Self::Rotate270 => (true, false),
            Self::Rotate180 | Self::MirrorHorizontalRotate270 => (true, true),
            Self::MirrorVertical | Self::Rotate90 => (false, true),
        }
    }
}

/// Orientation plus user-requested flips.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transform {
    /// Orientation reported by the decoder.
    pub orientation: Orientation,
    /// Extra left/right mirror.
    pub flip_x: bool,
    /// Extra top/bottom mirror.
    pub flip_y: bool,
}

/// Output grid extent, in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Extent {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
}

/// Linear sample index for output cell `(x, y)`.
///
/// Coordinates past the grid (the edge detector looks one cell right and
/// down) are clamped to the last column/row after mirroring. `src_width` is
/// the row stride of the accumulation buffer.
///
/// # Example
/// ```
/// use gg_core::orientation::{sample_index, Extent, Orientation, Transform};
/// let t = Transform { orientation: Orientation::Rotate180, ..Transform::default() };
/// let grid = Extent { width: 3, height: 2 };
/// assert_eq!(sample_index(&t, grid, 3, false, 0, 0), 5);
/// assert_eq!(sample_index(&t, grid, 3, false, 2, 1), 0);
/// ```
#[inline(always)]
#[must_use]
pub fn sample_index(
    transform: &Transform,
    grid: Extent,
    src_width: u32,
    switch_axes: bool,
    x: u32,
    y: u32,
) -> usize {
    let (mirror_x, mirror_y) = transform.orientation.mirrors();
    let w = i64::from(grid.width);
    let h = i64::from(grid.height);
    let (x, y) = (i64::from(x), i64::from(y));

    let fx = if mirror_x != transform.flip_x { w - x - 1 } else { x };
    let fy = if mirror_y != transform.flip_y { h - y - 1 } else { y };

    let cx = fx.clamp(0, (w - 1).max(0)) as usize;
    let cy = fy.clamp(0, (h - 1).max(0)) as usize;
    let stride = src_width as usize;

    if switch_axes {
        cy + cx * stride
    } else {
        cx + cy * stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners(orientation: Orientation, w: u32, h: u32) -> (usize, usize) {
        let t = Transform {
            orientation,
            ..Transform::default()
        };
        let swap = orientation.switches_axes();
        let grid = Extent {
            width: w,
            height: h,
        };
        let src_width = if swap { h } else { w };
        (
            sample_index(&t, grid, src_width, swap, 0, 0),
            sample_index(&t, grid, src_width, swap, w - 1, h - 1),
        )
    }

    #[test]
    fn corner_mapping_for_every_orientation() {
        // Grid 4×3. Unswapped stride 4 (12 samples), swapped stride 3.
        let (w, h) = (4, 3);
        let expected = [
            (Orientation::Horizontal, (0, 11)),
            (Orientation::MirrorHorizontal, (3, 8)),
            (Orientation::Rotate180, (11, 0)),
            (Orientation::MirrorVertical, (8, 3)),
            // swapped: index = y + x * 3
            (Orientation::MirrorHorizontalRotate90, (0, 11)),
            (Orientation::Rotate270, (9, 2)),
            (Orientation::MirrorHorizontalRotate270, (11, 0)),
            (Orientation::Rotate90, (2, 9)),
        ];
        for (orientation, want) in expected {
            assert_eq!(corners(orientation, w, h), want, "{orientation:?}");
        }
    }

    #[test]
    fn flips_compose_with_orientation() {
        let grid = Extent {
            width: 4,
            height: 3,
        };
        let flipped = Transform {
            orientation: Orientation::MirrorHorizontal,
            flip_x: true,
            flip_y: false,
        };
        // Mirror plus flip cancel out.
        assert_eq!(sample_index(&flipped, grid, 4, false, 1, 2), 1 + 2 * 4);

        let flip_y = Transform {
            flip_y: true,
            ..Transform::default()
        };
        assert_eq!(sample_index(&flip_y, grid, 4, false, 1, 0), 1 + 2 * 4);
    }

    #[test]
    fn look_ahead_is_clamped() {
        let grid = Extent {
            width: 4,
            height: 3,
        };
        let t = Transform::default();
        assert_eq!(
            sample_index(&t, grid, 4, false, 4, 3),
            sample_index(&t, grid, 4, false, 3, 2)
        );
        let r = Transform {
            orientation: Orientation::Rotate180,
            ..Transform::default()
        };
        // Mirrored look-ahead lands at -1 and clamps to 0.
        assert_eq!(sample_index(&r, grid, 4, false, 4, 3), 0);
    }

    #[test]
    fn exif_tags_round_trip() {
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_exif(o.exif()), o);
        }
    }
}
