use std::io;

use crate::color::Rgb;
use crate::error::CoreError;

/// Receives decoded scanlines, in non-decreasing row order.
///
/// Implemented by the resampler; driven by the decode service.
///
/// # Example
/// ```
/// use gg_core::traits::ScanlineSink;
/// use gg_core::error::CoreError;
///
/// struct CountRows(u32);
/// impl ScanlineSink for CountRows {
///     fn scanline(&mut self, _row: &[u8], _y: u32, _channels: u8) -> Result<(), CoreError> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// let mut sink = CountRows(0);
/// sink.scanline(&[0, 0, 0], 0, 3).unwrap();
/// assert_eq!(sink.0, 1);
/// ```
pub trait ScanlineSink {
    /// Fold one row of `channels`-interleaved 8-bit samples, tagged with its
    /// row index `y` in the source.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSourceStream`] for out-of-order rows,
    /// out-of-range rows or malformed rows.
    fn scanline(&mut self, row: &[u8], y: u32, channels: u8) -> Result<(), CoreError>;
}

/// Where rendered text goes.
///
/// Terminal sinks write everything verbatim. Markup sinks escape glyphs, turn
/// colored glyphs into styled spans and emit their own line terminator.
///
/// # Example
/// ```
/// use gg_core::traits::OutputSink;
/// let mut out = String::new();
/// out.glyph("#").unwrap();
/// out.line_end().unwrap();
/// assert_eq!(out, "#\n");
/// ```
pub trait OutputSink {
    /// Raw bytes: escapes, margins, borders.
    ///
    /// # Errors
    /// Returns the underlying write error.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// An uncolored glyph.
    ///
    /// # Errors
    /// Returns the underlying write error.
    fn glyph(&mut self, glyph: &str) -> io::Result<()> {
        self.write_str(glyph)
    }

    /// A glyph with a text color and a fill color.
    ///
    /// # Errors
    /// Returns the underlying write error.
    fn markup_glyph(&mut self, glyph: &str, _fg: Rgb, _bg: Rgb) -> io::Result<()> {
        self.glyph(glyph)
    }

    /// End of a grid row.
    ///
    /// # Errors
    /// Returns the underlying write error.
    fn line_end(&mut self) -> io::Result<()> {
        self.write_str("\n")
    }
}

impl OutputSink for String {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }
}

/// Lets a `&mut dyn OutputSink` be passed where a sink is expected.
impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        (**self).write_str(s)
    }

    fn glyph(&mut self, glyph: &str) -> io::Result<()> {
        (**self).glyph(glyph)
    }

    fn markup_glyph(&mut self, glyph: &str, fg: Rgb, bg: Rgb) -> io::Result<()> {
        (**self).markup_glyph(glyph, fg, bg)
    }

    fn line_end(&mut self) -> io::Result<()> {
        (**self).line_end()
    }
}
