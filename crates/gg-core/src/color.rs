use serde::{Deserialize, Serialize};

/// RGB triple, 0..=255 per channel.
pub type Rgb = (u8, u8, u8);

/// Smallest non-zero 8-bit channel value, as a normalized sample.
///
/// Channels below this count as "no color" when telling apart grayscale
/// pixels from colored ones.
pub const CHANNEL_EPSILON: f32 = 1.0 / 255.0;

/// Per-cell sample read from a normalized [`Raster`](crate::raster::Raster).
///
/// All components lie in `[0, 1]`. `r`, `g`, `b` stay at zero when the
/// raster carries no color planes or the source was grayscale.
///
/// # Example
/// ```
/// use gg_core::color::ColorSample;
/// let s = ColorSample { y: 0.5, r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
/// assert!(s.is_pure_luminance());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorSample {
    /// Luminance.
    pub y: f32,
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Opacity (1.0 = opaque).
    pub a: f32,
}

impl ColorSample {
    /// Sentinel that never equals a real sample; starts each row's elision state.
    pub const UNSET: Self = Self {
        y: -1.0,
        r: -1.0,
        g: -1.0,
        b: -1.0,
        a: -1.0,
    };

    /// Multiply the color channels by alpha. Luminance and alpha are kept.
    ///
    /// # Example
    /// ```
    /// use gg_core::color::ColorSample;
    /// let s = ColorSample { y: 0.8, r: 1.0, g: 0.5, b: 0.0, a: 0.5 }.premultiplied();
    /// assert_eq!((s.r, s.g, s.b), (0.5, 0.25, 0.0));
    /// assert_eq!(s.y, 0.8);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn premultiplied(self) -> Self {
        Self {
            r: self.r * self.a,
            g: self.g * self.a,
            b: self.b * self.a,
            ..self
        }
    }

    /// True for a pixel that carries luminance but no color: every channel
    /// below [`CHANNEL_EPSILON`] while `y` is above it.
    #[inline(always)]
    #[must_use]
    pub fn is_pure_luminance(&self) -> bool {
        self.r < CHANNEL_EPSILON
            && self.g < CHANNEL_EPSILON
            && self.b < CHANNEL_EPSILON
            && self.y > CHANNEL_EPSILON
    }
}

/// Channel weights turning R, G, B into perceived luminance.
///
/// # Example
/// ```
/// use gg_core::color::LuminanceWeights;
/// let w = LuminanceWeights::default();
/// assert!((w.luminance(255, 255, 255) - 1.0).abs() < 1e-4);
/// assert_eq!(w.luminance(0, 0, 0), 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct LuminanceWeights {
    /// Red weight.
    pub red: f32,
    /// Green weight.
    pub green: f32,
    /// Blue weight.
    pub blue: f32,
}

impl Default for LuminanceWeights {
    fn default() -> Self {
        Self {
            red: 0.2989,
            green: 0.5866,
            blue: 0.1145,
        }
    }
}

impl LuminanceWeights {
    /// Rescale so the weights sum to 1. Weights already summing to 1 are kept
    /// as-is; a zero or non-finite sum falls back to the defaults.
    ///
    /// # Example
    /// ```
    /// use gg_core::color::LuminanceWeights;
    /// let w = LuminanceWeights { red: 1.0, green: 1.0, blue: 2.0 }.normalized();
    /// assert_eq!((w.red, w.green, w.blue), (0.25, 0.25, 0.5));
    /// ```
    #[must_use]
    pub fn normalized(self) -> Self {
        let sum = self.red + self.green + self.blue;
        if !sum.is_finite() || sum <= 0.0 {
            return Self::default();
        }
        if (sum - 1.0).abs() <= 1e-6 {
            return self;
        }
        Self {
            red: self.red / sum,
            green: self.green / sum,
            blue: self.blue / sum,
        }
    }

    /// Weighted luminance of an 8-bit RGB sample, in `[0, 1]`.
    #[inline(always)]
    #[must_use]
    pub fn luminance(&self, r: u8, g: u8, b: u8) -> f32 {
        (f32::from(r) * self.red + f32::from(g) * self.green + f32::from(b) * self.blue) / 255.0
    }
}
