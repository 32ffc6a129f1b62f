use std::f64::consts::PI;

use gg_core::orientation::Transform;
use gg_core::raster::Raster;

/// Directional glyphs, indexed by direction bucket.
pub const DIRECTIONAL_GLYPHS: [&str; 4] = ["=", "/", "|", "\\"];

/// 2×2 finite-difference gradient.
///
/// `x` is the top-to-bottom difference and `y` the left-to-right one, so a
/// vertical edge (dark left, bright right) has a large `y` component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    /// Kernel `[-1, 0, 1, 0]` over the patch.
    pub x: f32,
    /// Kernel `[-1, 1, 0, 0]` over the patch.
    pub y: f32,
}

impl Gradient {
    /// Gradient of the patch `[p(x,y), p(x+1,y), p(x,y+1), p(x+1,y+1)]`.
    ///
    /// # Example
    /// ```
    /// use gg_ascii::edge::Gradient;
    /// let g = Gradient::from_patch([0.0, 1.0, 0.0, 1.0]);
    /// assert_eq!((g.x, g.y), (0.0, 1.0));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn from_patch(patch: [f32; 4]) -> Self {
        const KERNEL_X: [f32; 4] = [-1.0, 0.0, 1.0, 0.0];
        const KERNEL_Y: [f32; 4] = [-1.0, 1.0, 0.0, 0.0];
        let mut x = 0.0;
        let mut y = 0.0;
        for ((kx, ky), p) in KERNEL_X.iter().zip(&KERNEL_Y).zip(patch) {
            x += kx * p;
            y += ky * p;
        }
        Self { x, y }
    }

    /// Euclidean norm.
    #[inline(always)]
    #[must_use]
    pub fn magnitude(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Index into [`DIRECTIONAL_GLYPHS`]: `atan(y/x)` scaled to quarter
    /// turns, offset by half a bucket and wrapped into `[0, 4)`.
    #[inline(always)]
    #[must_use]
    pub fn bucket(self) -> usize {
        let direction = f64::from(f64::from(self.y / self.x).atan() as f32);
        let scaled = direction / PI * 4.0 + 0.5;
        ((scaled + 4.0) % 4.0) as usize % 4
    }

    /// Glyph for this gradient's direction.
    #[inline(always)]
    #[must_use]
    pub fn glyph(self) -> &'static str {
        DIRECTIONAL_GLYPHS[self.bucket()]
    }
}

/// Gradient at grid cell `(x, y)`; reads past the last row/column clamp.
///
/// # Example
/// ```
/// use gg_core::color::ColorSample;
/// use gg_core::orientation::Transform;
/// use gg_core::raster::Raster;
/// use gg_ascii::edge::gradient;
/// let dark = ColorSample { y: 0.0, r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
/// let raster = Raster::from_samples(2, 1, &[dark, dark]).unwrap();
/// assert_eq!(gradient(&raster, &Transform::default(), 1, 0).magnitude(), 0.0);
/// ```
#[inline(always)]
#[must_use]
pub fn gradient(raster: &Raster, transform: &Transform, x: u32, y: u32) -> Gradient {
    Gradient::from_patch([
        raster.luminance_at(transform, x, y),
        raster.luminance_at(transform, x + 1, y),
        raster.luminance_at(transform, x, y + 1),
        raster.luminance_at(transform, x + 1, y + 1),
    ])
}

/// Edge classification settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeOptions {
    /// Magnitude above which a cell is an edge.
    pub threshold: f32,
    /// Blank every non-edge cell.
    pub only: bool,
}

/// What the edge detector decided for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeClass {
    /// Use this directional glyph.
    Edge(&'static str),
    /// Fall through to the palette.
    Flat,
    /// Fall through to the palette with the luminance position forced to 0.
    Blank,
}

impl EdgeOptions {
    /// Classify a gradient.
    ///
    /// # Example
    /// ```
    /// use gg_ascii::edge::{EdgeClass, EdgeOptions, Gradient};
    /// let opts = EdgeOptions { threshold: 0.5, only: false };
    /// let g = Gradient::from_patch([0.0, 1.0, 0.0, 1.0]);
    /// assert_eq!(opts.classify(g), EdgeClass::Edge("|"));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn classify(&self, gradient: Gradient) -> EdgeClass {
        let magnitude = gradient.magnitude();
        if magnitude > self.threshold {
            EdgeClass::Edge(gradient.glyph())
        } else if self.only && magnitude < self.threshold {
            EdgeClass::Blank
        } else {
            EdgeClass::Flat
        }
    }
}
