use crate::error::CoreError;

/// Default palette: light glyphs first, densest last (dark pixels on light paper).
pub const PALETTE_DEFAULT: &str = "   ...',;:clodxkO0KXNWM";

/// 10 caractères, compact et contrasté.
pub const PALETTE_COMPACT: &str = " .:-=+*#%@";

/// Blocs Unicode en pseudo-pixels.
pub const PALETTE_BLOCKS: &str = " ░▒▓█";

/// Ordered glyph sequence indexed by intensity level.
///
/// Glyphs may be multi-byte UTF-8; each level has a byte offset and length
/// into the backing string so lookups never re-scan it.
///
/// # Example
/// ```
/// use gg_core::palette::Palette;
/// let p = Palette::new(" .:#").unwrap();
/// assert_eq!(p.levels(), 3);
/// assert_eq!(p.glyph(0), " ");
/// assert_eq!(p.glyph(3), "#");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    glyphs: String,
    byte_offset: Vec<usize>,
    byte_length: Vec<usize>,
}

impl Palette {
    /// Build a palette from its glyphs, one per `char`.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if `glyphs` is empty.
    ///
    /// # Example
    /// ```
    /// use gg_core::palette::Palette;
    /// let p = Palette::new(" ░▒▓█").unwrap();
    /// assert_eq!(p.glyph(4), "█");
    /// assert!(Palette::new("").is_err());
    /// ```
    pub fn new(glyphs: &str) -> Result<Self, CoreError> {
        if glyphs.is_empty() {
            return Err(CoreError::Config("palette vide".into()));
        }
        let (byte_offset, byte_length) = glyphs
            .char_indices()
            .map(|(offset, ch)| (offset, ch.len_utf8()))
            .unzip();
        Ok(Self {
            glyphs: glyphs.to_string(),
            byte_offset,
            byte_length,
        })
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.byte_offset.len()
    }

    /// Always false: construction rejects empty palettes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.byte_offset.is_empty()
    }

    /// Highest valid level (`len - 1`). Luminance is scaled by this value.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.len() - 1
    }

    /// Glyph at `level`, clamped to the last one.
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, level: usize) -> &str {
        let level = level.min(self.levels());
        let start = self.byte_offset[level];
        &self.glyphs[start..start + self.byte_length[level]]
    }

    /// The palette as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.glyphs
    }
}

impl Default for Palette {
    fn default() -> Self {
        let glyphs = PALETTE_DEFAULT;
        Self {
            glyphs: glyphs.to_string(),
            byte_offset: (0..glyphs.len()).collect(),
            byte_length: vec![1; glyphs.len()],
        }
    }
}
