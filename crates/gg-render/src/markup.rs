use std::borrow::Cow;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use gg_core::color::Rgb;
use gg_core::config::HtmlOptions;
use gg_core::traits::OutputSink;

/// Markup flavor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// HTML5 document, `<br>` line breaks.
    Html,
    /// XHTML 1.0 Strict document, `<br/>` line breaks.
    Xhtml,
}

impl Dialect {
    fn line_break(self) -> &'static str {
        match self {
            Self::Html => "<br>\n",
            Self::Xhtml => "<br/>\n",
        }
    }
}

/// Escape the characters that are significant in markup.
///
/// # Example
/// ```
/// use gg_render::markup::escape;
/// assert_eq!(escape("<&>"), "&lt;&amp;&gt;");
/// assert_eq!(escape("#"), "#");
/// ```
#[must_use]
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn hex((r, g, b): Rgb) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Writes the grid as an HTML or XHTML fragment, optionally wrapped in a
/// full document by [`MarkupSink::begin`] and [`MarkupSink::end`].
///
/// # Example
/// ```
/// use gg_core::traits::OutputSink;
/// use gg_render::markup::{Dialect, MarkupSink};
/// let mut sink = MarkupSink::new(Vec::new(), Dialect::Xhtml, false);
/// sink.markup_glyph("#", (255, 0, 0), (255, 255, 255)).unwrap();
/// sink.line_end().unwrap();
/// let out = String::from_utf8(sink.finish().unwrap()).unwrap();
/// assert_eq!(out, "<span style=\"color: #ff0000;\">#</span><br/>\n");
/// ```
pub struct MarkupSink<W: Write> {
    out: BufWriter<W>,
    dialect: Dialect,
    fill: bool,
}

impl<W: Write> MarkupSink<W> {
    /// `fill` adds the background color to every span.
    pub fn new(out: W, dialect: Dialect, fill: bool) -> Self {
        Self {
            out: BufWriter::new(out),
            dialect,
            fill,
        }
    }

    /// Document prologue, head with the stylesheet, and the opening of the
    /// grid container.
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn begin(&mut self, options: &HtmlOptions) -> io::Result<()> {
        let title = escape(&options.title);
        match self.dialect {
            Dialect::Html => write!(
                self.out,
                "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n"
            )?,
            Dialect::Xhtml => write!(
                self.out,
                "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                 <!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
                 \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\">\n\
                 <html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"en\" lang=\"en\">\n\
                 <head>\n\
                 <meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\" />\n\
                 <title>{title}</title>\n"
            )?,
        }
        let (background, foreground) = if options.dark_background {
            ("#000000", "#ffffff")
        } else {
            ("#ffffff", "#000000")
        };
        let weight = if options.bold { "bold" } else { "normal" };
        write!(
            self.out,
            "<style type=\"text/css\">\n\
             .glyphgrid {{\n\
             \x20 font-family: \"Courier New\", Courier, monospace;\n\
             \x20 font-size: {}pt;\n\
             \x20 font-weight: {weight};\n\
             \x20 line-height: 1;\n\
             \x20 white-space: pre;\n\
             \x20 background-color: {background};\n\
             \x20 color: {foreground};\n\
             }}\n\
             </style>\n</head>\n<body>\n<div class=\"glyphgrid\">\n",
            options.font_size
        )
    }

    /// Close the grid container and the document.
    ///
    /// # Errors
    /// Propagates write errors.
    pub fn end(&mut self) -> io::Result<()> {
        self.out.write_all(b"</div>\n</body>\n</html>\n")
    }

    /// Flush and hand back the writer.
    ///
    /// # Errors
    /// Returns an error if the final flush fails.
    pub fn finish(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(io::IntoInnerError::into_error)
            .context("Impossible de vider la sortie HTML")
    }
}

impl<W: Write> OutputSink for MarkupSink<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    fn glyph(&mut self, glyph: &str) -> io::Result<()> {
        self.out.write_all(escape(glyph).as_bytes())
    }

    fn markup_glyph(&mut self, glyph: &str, fg: Rgb, bg: Rgb) -> io::Result<()> {
        let glyph = escape(glyph);
        if self.fill {
            write!(
                self.out,
                "<span style=\"color: {}; background-color: {};\">{glyph}</span>",
                hex(fg),
                hex(bg)
            )
        } else {
            write!(self.out, "<span style=\"color: {};\">{glyph}</span>", hex(fg))
        }
    }

    fn line_end(&mut self) -> io::Result<()> {
        self.out.write_all(self.dialect.line_break().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(dialect: Dialect, fill: bool, f: impl FnOnce(&mut MarkupSink<Vec<u8>>)) -> String {
        let mut sink = MarkupSink::new(Vec::new(), dialect, fill);
        f(&mut sink);
        String::from_utf8(sink.finish().unwrap()).unwrap()
    }

    #[test]
    fn plain_glyphs_are_escaped() {
        let out = render(Dialect::Html, false, |s| {
            s.glyph("&").unwrap();
            s.glyph("'").unwrap();
            s.line_end().unwrap();
        });
        assert_eq!(out, "&amp;&#39;<br>\n");
    }

    #[test]
    fn fill_adds_the_background() {
        let out = render(Dialect::Html, true, |s| {
            s.markup_glyph("<", (0, 128, 0), (0, 255, 0)).unwrap();
        });
        assert_eq!(
            out,
            "<span style=\"color: #008000; background-color: #00ff00;\">&lt;</span>"
        );
    }

    #[test]
    fn html_document_wraps_the_grid() {
        let options = HtmlOptions {
            title: "a & b".into(),
            font_size: 6,
            bold: true,
            dark_background: true,
        };
        let out = render(Dialect::Html, false, |s| {
            s.begin(&options).unwrap();
            s.glyph("#").unwrap();
            s.end().unwrap();
        });
        assert!(out.starts_with("<!DOCTYPE html>\n"));
        assert!(out.contains("<title>a &amp; b</title>"));
        assert!(out.contains("font-size: 6pt;"));
        assert!(out.contains("font-weight: bold;"));
        assert!(out.contains("background-color: #000000;"));
        assert!(out.ends_with("<div class=\"glyphgrid\">\n#</div>\n</body>\n</html>\n"));
    }

    #[test]
    fn xhtml_document_has_xml_prolog() {
        let out = render(Dialect::Xhtml, false, |s| {
            s.begin(&HtmlOptions::default()).unwrap();
            s.end().unwrap();
        });
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(out.contains("xmlns=\"http://www.w3.org/1999/xhtml\""));
        assert!(out.contains("font-weight: normal;"));
        assert!(out.contains("background-color: #ffffff;"));
    }
}
