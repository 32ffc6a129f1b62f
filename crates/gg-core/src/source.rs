use crate::orientation::Orientation;

/// What the decode service reports before streaming scanlines.
///
/// # Example
/// ```
/// use gg_core::source::SourceHeader;
/// use gg_core::orientation::Orientation;
/// let h = SourceHeader { width: 640, height: 480, channels: 3, orientation: Orientation::Rotate90 };
/// assert_eq!(h.display_size(), (480, 640));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceHeader {
    /// Stored width in pixels.
    pub width: u32,
    /// Stored height in pixels.
    pub height: u32,
    /// Interleaved channels per pixel: 1 (gray), 2 (gray+alpha), 3 (RGB), 4 (RGBA).
    pub channels: u8,
    /// Orientation tag, `Horizontal` when absent.
    pub orientation: Orientation,
}

impl SourceHeader {
    /// Size as displayed upright, after a possible quarter turn.
    #[must_use]
    pub fn display_size(&self) -> (u32, u32) {
        if self.orientation.switches_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Whether the last channel is alpha.
    #[must_use]
    pub fn has_alpha(&self) -> bool {
        self.channels == 2 || self.channels == 4
    }
}
