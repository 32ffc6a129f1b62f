use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use gg_core::traits::OutputSink;

/// Fallback when the terminal size cannot be queried (pipes, CI).
pub const FALLBACK_SIZE: (u32, u32) = (80, 25);

/// Terminal size in cells, with explicit overrides taking precedence.
///
/// # Example
/// ```
/// use gg_render::terminal::terminal_size;
/// assert_eq!(terminal_size(Some(100), Some(40)), (100, 40));
/// ```
#[must_use]
pub fn terminal_size(width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    if let (Some(w), Some(h)) = (width, height) {
        return (w, h);
    }
    let detected = match crossterm::terminal::size() {
        Ok((w, h)) if w > 0 && h > 0 => (u32::from(w), u32::from(h)),
        Ok(_) => FALLBACK_SIZE,
        Err(e) => {
            log::debug!("taille du terminal indisponible ({e}), {FALLBACK_SIZE:?} par défaut");
            FALLBACK_SIZE
        }
    };
    (width.unwrap_or(detected.0), height.unwrap_or(detected.1))
}

/// Writes glyphs, escapes and newlines as-is through a buffered writer.
///
/// # Example
/// ```
/// use gg_core::traits::OutputSink;
/// use gg_render::terminal::TerminalSink;
/// let mut sink = TerminalSink::new(Vec::new());
/// sink.glyph("<#>").unwrap();
/// sink.line_end().unwrap();
/// assert_eq!(sink.finish().unwrap(), b"<#>\n");
/// ```
pub struct TerminalSink<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> TerminalSink<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
        }
    }

    /// Flush and hand back the writer.
    ///
    /// # Errors
    /// Returns an error if the final flush fails.
    pub fn finish(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(io::IntoInnerError::into_error)
            .context("Impossible de vider la sortie terminal")
    }
}

impl<W: Write> OutputSink for TerminalSink<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }
}
