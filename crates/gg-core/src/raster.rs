use crate::color::ColorSample;
use crate::error::CoreError;
use crate::orientation::{Extent, Orientation, Transform, sample_index};

/// Red, green and blue planes, present only when color output is requested.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorPlanes {
    /// Red accumulation/average.
    pub red: Vec<f32>,
    /// Green accumulation/average.
    pub green: Vec<f32>,
    /// Blue accumulation/average.
    pub blue: Vec<f32>,
}

/// Downsampled image, one sample per output cell.
///
/// Holds running sums while the resampler streams scanlines in, and averages
/// once it has been normalized. Buffers are stored in source pixel order
/// (`src_width × src_height`), which differs from the grid order when the
/// orientation swaps axes.
///
/// # Example
/// ```
/// use gg_core::raster::Raster;
/// use gg_core::orientation::Orientation;
/// let r = Raster::allocate(4, 2, Orientation::Rotate90, true).unwrap();
/// assert_eq!((r.src_width, r.src_height), (2, 4));
/// assert_eq!(r.luminance.len(), 8);
/// assert_eq!(r.col_lookup.len(), 3);
/// assert!(r.alpha.iter().all(|&a| a == 1.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Buffer row stride.
    pub src_width: u32,
    /// Buffer rows.
    pub src_height: u32,
    /// Luminance per sample.
    pub luminance: Vec<f32>,
    /// Color planes, `None` in monochrome renders.
    pub color: Option<ColorPlanes>,
    /// Opacity per sample.
    pub alpha: Vec<f32>,
    /// Scanlines folded into each buffer row.
    pub row_accum: Vec<u32>,
    /// Source column boundaries per buffer column, plus one sentinel.
    pub col_lookup: Vec<u32>,
    /// Orientation of the stored samples.
    pub orientation: Orientation,
    /// `true` when buffer rows are grid columns.
    pub switch_axes: bool,
}

/// Allocate `len` copies of `value`, reporting failure instead of aborting.
fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>, CoreError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| CoreError::AllocationFailure {
            bytes: len.saturating_mul(size_of::<T>()),
        })?;
    v.resize(len, value);
    Ok(v)
}

impl Raster {
    /// Allocate zeroed accumulation buffers for a `width × height` grid.
    ///
    /// Alpha starts at 1.0 so sources without an alpha channel render opaque.
    ///
    /// # Errors
    /// [`CoreError::DegenerateDimension`] for an empty grid,
    /// [`CoreError::AllocationFailure`] when the buffers cannot be reserved.
    pub fn allocate(
        width: u32,
        height: u32,
        orientation: Orientation,
        color: bool,
    ) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::DegenerateDimension { width, height });
        }
        let switch_axes = orientation.switches_axes();
        let (src_width, src_height) = if switch_axes {
            (height, width)
        } else {
            (width, height)
        };
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(CoreError::AllocationFailure { bytes: usize::MAX })?;

        let color = if color {
            Some(ColorPlanes {
                red: try_filled(len, 0.0)?,
                green: try_filled(len, 0.0)?,
                blue: try_filled(len, 0.0)?,
            })
        } else {
            None
        };

        Ok(Self {
            width,
            height,
            src_width,
            src_height,
            luminance: try_filled(len, 0.0)?,
            color,
            alpha: try_filled(len, 1.0)?,
            row_accum: try_filled(src_height as usize, 0)?,
            col_lookup: try_filled(src_width as usize + 1, 0)?,
            orientation,
            switch_axes,
        })
    }

    /// Build an already-normalized raster from grid-ordered samples, with
    /// `Horizontal` orientation and color planes.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] when `samples` does not hold exactly
    /// `width × height` entries, plus the errors of [`Raster::allocate`].
    ///
    /// # Example
    /// ```
    /// use gg_core::raster::Raster;
    /// use gg_core::color::ColorSample;
    /// let s = ColorSample { y: 0.25, r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    /// let r = Raster::from_samples(2, 1, &[s, s]).unwrap();
    /// assert_eq!(r.sample(1), s);
    /// ```
    pub fn from_samples(width: u32, height: u32, samples: &[ColorSample]) -> Result<Self, CoreError> {
        if samples.len() != width as usize * height as usize {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        let mut raster = Self::allocate(width, height, Orientation::Horizontal, true)?;
        for (i, s) in samples.iter().enumerate() {
            raster.luminance[i] = s.y;
            raster.alpha[i] = s.a;
            if let Some(planes) = raster.color.as_mut() {
                planes.red[i] = s.r;
                planes.green[i] = s.g;
                planes.blue[i] = s.b;
            }
        }
        raster.row_accum.fill(1);
        Ok(raster)
    }

    /// Grid extent.
    #[inline(always)]
    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent {
            width: self.width,
            height: self.height,
        }
    }

    /// Buffer index of grid cell `(x, y)` under `transform`.
    ///
    /// The transform's orientation is ignored in favor of the raster's own.
    #[inline(always)]
    #[must_use]
    pub fn index(&self, transform: &Transform, x: u32, y: u32) -> usize {
        let t = Transform {
            orientation: self.orientation,
            ..*transform
        };
        sample_index(&t, self.extent(), self.src_width, self.switch_axes, x, y)
    }

    /// Luminance of grid cell `(x, y)`; out-of-grid coordinates clamp.
    #[inline(always)]
    #[must_use]
    pub fn luminance_at(&self, transform: &Transform, x: u32, y: u32) -> f32 {
        self.luminance[self.index(transform, x, y)]
    }

    /// Full sample at buffer index `idx`. Color channels are zero without
    /// color planes.
    #[inline(always)]
    #[must_use]
    pub fn sample(&self, idx: usize) -> ColorSample {
        let (r, g, b) = self
            .color
            .as_ref()
            .map_or((0.0, 0.0, 0.0), |c| (c.red[idx], c.green[idx], c.blue[idx]));
        ColorSample {
            y: self.luminance[idx],
            r,
            g,
            b,
            a: self.alpha[idx],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_is_degenerate() {
        let err = Raster::allocate(0, 5, Orientation::Horizontal, false).unwrap_err();
        assert!(matches!(err, CoreError::DegenerateDimension { width: 0, height: 5 }));
    }

    #[test]
    fn monochrome_raster_has_no_color_planes() {
        let r = Raster::allocate(3, 3, Orientation::Horizontal, false).unwrap();
        assert!(r.color.is_none());
        assert_eq!(r.sample(4).r, 0.0);
    }

    #[test]
    fn rotated_raster_indexes_transposed() {
        let mut r = Raster::allocate(3, 2, Orientation::MirrorHorizontalRotate90, false).unwrap();
        // Buffer is 2 wide, 3 tall; grid cell (x, y) reads buffer (y, x).
        r.luminance[1 + 2 * 2] = 0.75;
        assert_eq!(r.luminance_at(&Transform::default(), 2, 1), 0.75);
    }

    #[test]
    fn sample_count_must_match_grid() {
        assert!(Raster::from_samples(2, 2, &[]).is_err());
    }
}
