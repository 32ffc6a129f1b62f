use std::io;

use gg_core::color::{CHANNEL_EPSILON, ColorSample, Rgb};
use gg_core::config::ColorDepth;
use gg_core::numeric::{round_half_up, round_u8};
use gg_core::traits::OutputSink;

/// Channel dominance margin for the 8-color classifier.
const HUE_THRESHOLD: f32 = 0.1;
/// Minimum sum of two dominant channels for a mixed hue.
const HUE_INTENSITY: f32 = 1.0 - HUE_THRESHOLD;
/// Near-white luminance rendered bold instead of colored.
const HIGHLIGHT_LUMINANCE: f32 = 0.95;
/// Bold white threshold when grayscale is forced.
const GRAYSCALE_HIGHLIGHT: f32 = 0.7;
/// Gray ramp stops for the 256-color palette.
const RAMP_BLACK: f32 = 0.15;
const RAMP_WHITE: f32 = 0.965;

const WHITE: Rgb = (255, 255, 255);

/// How one glyph is decorated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    /// Bare glyph.
    Plain,
    /// `ESC[1m` glyph `ESC[0m`.
    Bold,
    /// `ESC[{code}m` glyph, 30–37 or 40–47.
    Ansi4(u8),
    /// 256-color escape, with a foreground companion in fill mode.
    Ansi8 {
        /// 38 (foreground) or 48 (fill).
        kind: u8,
        /// Palette index.
        index: u8,
        /// Foreground index written before the fill escape.
        companion: Option<u8>,
    },
    /// 24-bit escape, with a foreground companion in fill mode.
    TrueColor {
        /// 38 (foreground) or 48 (fill).
        kind: u8,
        /// Main color.
        rgb: Rgb,
        /// Foreground color written before the fill escape.
        companion: Option<Rgb>,
    },
    /// Markup span colors.
    Markup {
        /// Text color.
        fg: Rgb,
        /// Fill color.
        bg: Rgb,
    },
}

impl Paint {
    /// Write `glyph` with this decoration.
    ///
    /// # Errors
    /// Propagates sink write errors.
    ///
    /// # Example
    /// ```
    /// use gg_ascii::color_map::Paint;
    /// let mut out = String::new();
    /// Paint::Ansi8 { kind: 38, index: 0, companion: None }.write(&mut out, "#").unwrap();
    /// assert_eq!(out, "\x1b[38;5;00m#");
    /// ```
    pub fn write<S: OutputSink + ?Sized>(&self, sink: &mut S, glyph: &str) -> io::Result<()> {
        match *self {
            Self::Plain => sink.glyph(glyph),
            Self::Bold => {
                sink.write_str("\x1b[1m")?;
                sink.glyph(glyph)?;
                sink.write_str("\x1b[0m")
            }
            Self::Ansi4(code) => {
                sink.write_str(&format!("\x1b[{code}m"))?;
                sink.glyph(glyph)
            }
            Self::Ansi8 {
                kind,
                index,
                companion,
            } => {
                if let Some(c) = companion {
                    sink.write_str(&format!("\x1b[38;5;{c}m"))?;
                }
                // Two digits keeps black as "00".
                sink.write_str(&format!("\x1b[{kind};5;{index:02}m"))?;
                sink.glyph(glyph)
            }
            Self::TrueColor {
                kind,
                rgb: (r, g, b),
                companion,
            } => {
                if let Some((cr, cg, cb)) = companion {
                    sink.write_str(&format!("\x1b[38;2;{cr};{cg};{cb}m"))?;
                }
                sink.write_str(&format!("\x1b[{kind};2;{r};{g};{b}m"))?;
                sink.glyph(glyph)
            }
            Self::Markup { fg, bg } => sink.markup_glyph(glyph, fg, bg),
        }
    }
}

/// Color quantizer for one render.
///
/// # Example
/// ```
/// use gg_ascii::color_map::{Paint, Quantizer};
/// use gg_core::color::ColorSample;
/// use gg_core::config::ColorDepth;
/// let q = Quantizer { depth: ColorDepth::Ansi4, fill: false, grayscale: false, markup: false };
/// let red = ColorSample { y: 0.3, r: 1.0, g: 0.0, b: 0.0, a: 1.0 };
/// assert_eq!(q.paint(&red), Paint::Ansi4(31));
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quantizer {
    /// Color depth; `None` disables color entirely.
    pub depth: ColorDepth,
    /// Color the cell background.
    pub fill: bool,
    /// Force the gray path.
    pub grayscale: bool,
    /// Emit markup triples instead of escapes.
    pub markup: bool,
}

impl Quantizer {
    /// Decoration for a normalized sample. Color channels are premultiplied
    /// by alpha here.
    #[must_use]
    pub fn paint(&self, sample: &ColorSample) -> Paint {
        if !self.depth.is_color() {
            return Paint::Plain;
        }
        let s = sample.premultiplied();
        let gray = self.grayscale || s.is_pure_luminance();
        if self.markup {
            return self.markup_paint(&s, gray);
        }
        match self.depth {
            ColorDepth::None => Paint::Plain,
            ColorDepth::Ansi4 => self.ansi4(&s),
            ColorDepth::Ansi8 => self.ansi8(&s, gray),
            ColorDepth::TrueColor => self.truecolor(&s, gray),
        }
    }

    #[inline(always)]
    fn kind(&self) -> u8 {
        if self.fill { 48 } else { 38 }
    }

    fn ansi4(&self, s: &ColorSample) -> Paint {
        let (t, i) = (HUE_THRESHOLD, HUE_INTENSITY);
        let ColorSample { y, r, g, b, .. } = *s;
        let mut highlight = y >= HIGHLIGHT_LUMINANCE
            && r < CHANNEL_EPSILON
            && g < CHANNEL_EPSILON
            && b < CHANNEL_EPSILON;

        let code = if self.grayscale {
            if y >= GRAYSCALE_HIGHLIGHT {
                highlight = true;
                37
            } else {
                0
            }
        } else if r - t > g && r - t > b {
            31
        } else if g - t > r && g - t > b {
            32
        } else if r - t > b && g - t > b && r + g > i {
            33
        } else if b - t > r && b - t > g && y < HIGHLIGHT_LUMINANCE {
            34
        } else if r - t > g && b - t > g && r + b > i {
            35
        } else if g - t > r && b - t > r && b + g > i {
            36
        } else if r + g + b >= 3.0 * y {
            37
        } else {
            0
        };

        match (code, highlight) {
            (0, false) => Paint::Plain,
            (0, true) => Paint::Bold,
            (c, _) if self.fill => Paint::Ansi4(c + 10),
            (c, _) => Paint::Ansi4(c),
        }
    }

    fn ansi8(&self, s: &ColorSample, gray: bool) -> Paint {
        let ColorSample { y, r, g, b, .. } = *s;
        let (index, companion) = if gray {
            if y < RAMP_BLACK {
                (0, 0)
            } else if y > RAMP_WHITE {
                (231, 244)
            } else {
                (
                    (round_half_up(24.0 * y) + 232) as u8,
                    (round_half_up(24.0 * y * 0.5) + 232) as u8,
                )
            }
        } else {
            (cube(r, g, b), cube(y * r, y * g, y * b))
        };
        Paint::Ansi8 {
            kind: self.kind(),
            index,
            companion: self.fill.then_some(companion),
        }
    }

    fn truecolor(&self, s: &ColorSample, gray: bool) -> Paint {
        let ColorSample { y, r, g, b, .. } = *s;
        let (rgb, companion) = if gray {
            (grey(255.0 * y), grey(255.0 * y * 0.5))
        } else {
            (
                (round_u8(255.0 * r), round_u8(255.0 * g), round_u8(255.0 * b)),
                (
                    round_u8(255.0 * y * r),
                    round_u8(255.0 * y * g),
                    round_u8(255.0 * y * b),
                ),
            )
        };
        Paint::TrueColor {
            kind: self.kind(),
            rgb,
            companion: self.fill.then_some(companion),
        }
    }

    fn markup_paint(&self, s: &ColorSample, gray: bool) -> Paint {
        let ColorSample { y, r, g, b, .. } = *s;
        let (fg, bg) = match (gray, self.fill) {
            (true, true) => (grey(255.0 * y * 0.5), grey(255.0 * y)),
            (true, false) => (grey(255.0 * y), WHITE),
            (false, true) => (
                (
                    round_u8(255.0 * y * r),
                    round_u8(255.0 * y * g),
                    round_u8(255.0 * y * b),
                ),
                (round_u8(255.0 * r), round_u8(255.0 * g), round_u8(255.0 * b)),
            ),
            (false, false) => (
                (round_u8(255.0 * r), round_u8(255.0 * g), round_u8(255.0 * b)),
                WHITE,
            ),
        };
        Paint::Markup { fg, bg }
    }
}

/// 6×6×6 cube index.
#[inline(always)]
fn cube(r: f32, g: f32, b: f32) -> u8 {
    let level = |c: f32| round_half_up(5.0 * c).clamp(0, 5);
    (16 + 36 * level(r) + 6 * level(g) + level(b)) as u8
}

#[inline(always)]
fn grey(v: f32) -> Rgb {
    let v = round_u8(v);
    (v, v, v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(y: f32, r: f32, g: f32, b: f32) -> ColorSample {
        ColorSample { y, r, g, b, a: 1.0 }
    }

    fn quantizer(depth: ColorDepth) -> Quantizer {
        Quantizer {
            depth,
            fill: false,
            grayscale: false,
            markup: false,
        }
    }

    fn render(q: &Quantizer, s: &ColorSample) -> String {
        let mut out = String::new();
        q.paint(s).write(&mut out, "#").unwrap();
        out
    }

    #[test]
    fn no_color_is_plain() {
        let q = quantizer(ColorDepth::None);
        assert_eq!(render(&q, &sample(0.3, 1.0, 0.0, 0.0)), "#");
    }

    #[test]
    fn four_level_hues() {
        let q = quantizer(ColorDepth::Ansi4);
        assert_eq!(q.paint(&sample(0.5, 0.0, 1.0, 0.0)), Paint::Ansi4(32));
        assert_eq!(q.paint(&sample(0.8, 1.0, 1.0, 0.0)), Paint::Ansi4(33));
        assert_eq!(q.paint(&sample(0.2, 0.0, 0.0, 1.0)), Paint::Ansi4(34));
        assert_eq!(q.paint(&sample(0.5, 1.0, 0.0, 1.0)), Paint::Ansi4(35));
        assert_eq!(q.paint(&sample(0.5, 0.0, 1.0, 1.0)), Paint::Ansi4(36));
        assert_eq!(q.paint(&sample(0.5, 0.6, 0.6, 0.6)), Paint::Ansi4(37));
        let fill = Quantizer { fill: true, ..q };
        assert_eq!(render(&fill, &sample(0.3, 1.0, 0.0, 0.0)), "\x1b[41m#");
    }

    #[test]
    fn four_level_highlight_is_bold() {
        let q = quantizer(ColorDepth::Ansi4);
        assert_eq!(render(&q, &sample(1.0, 0.0, 0.0, 0.0)), "\x1b[1m#\x1b[0m");
    }

    #[test]
    fn four_level_grayscale_forcing() {
        let q = Quantizer {
            grayscale: true,
            ..quantizer(ColorDepth::Ansi4)
        };
        assert_eq!(q.paint(&sample(0.8, 0.0, 0.0, 1.0)), Paint::Ansi4(37));
        assert_eq!(q.paint(&sample(0.5, 1.0, 0.0, 0.0)), Paint::Plain);
    }

    #[test]
    fn eight_bit_gray_ramp() {
        let q = quantizer(ColorDepth::Ansi8);
        assert_eq!(render(&q, &sample(0.1, 0.0, 0.0, 0.0)), "\x1b[38;5;00m#");
        assert_eq!(render(&q, &sample(0.5, 0.0, 0.0, 0.0)), "\x1b[38;5;244m#");
        assert_eq!(render(&q, &sample(0.99, 0.0, 0.0, 0.0)), "\x1b[38;5;231m#");
    }

    #[test]
    fn eight_bit_fill_writes_companion_first() {
        let q = Quantizer {
            fill: true,
            ..quantizer(ColorDepth::Ansi8)
        };
        assert_eq!(
            render(&q, &sample(0.1, 0.0, 0.0, 0.0)),
            "\x1b[38;5;0m\x1b[48;5;00m#"
        );
        assert_eq!(
            render(&q, &sample(1.0, 1.0, 0.0, 0.0)),
            "\x1b[38;5;196m\x1b[48;5;196m#"
        );
    }

    #[test]
    fn eight_bit_color_cube() {
        let q = quantizer(ColorDepth::Ansi8);
        assert_eq!(render(&q, &sample(0.3, 1.0, 0.0, 0.0)), "\x1b[38;5;196m#");
        assert_eq!(render(&q, &sample(0.7, 1.0, 1.0, 1.0)), "\x1b[38;5;231m#");
    }

    #[test]
    fn truecolor_gray_and_color() {
        let q = quantizer(ColorDepth::TrueColor);
        assert_eq!(
            render(&q, &sample(0.5, 0.0, 0.0, 0.0)),
            "\x1b[38;2;128;128;128m#"
        );
        let fill = Quantizer { fill: true, ..q };
        assert_eq!(
            render(&fill, &sample(0.5, 1.0, 0.0, 0.0)),
            "\x1b[38;2;128;0;0m\x1b[48;2;255;0;0m#"
        );
    }

    #[test]
    fn alpha_premultiplies_color() {
        let q = quantizer(ColorDepth::TrueColor);
        let s = ColorSample {
            y: 0.5,
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 0.5,
        };
        assert_eq!(render(&q, &s), "\x1b[38;2;128;0;0m#");
    }

    #[test]
    fn markup_triples() {
        let q = Quantizer {
            markup: true,
            ..quantizer(ColorDepth::TrueColor)
        };
        assert_eq!(
            q.paint(&sample(1.0, 0.0, 0.0, 0.0)),
            Paint::Markup {
                fg: (255, 255, 255),
                bg: WHITE
            }
        );
        let fill = Quantizer { fill: true, ..q };
        assert_eq!(
            fill.paint(&sample(1.0, 0.0, 0.0, 0.0)),
            Paint::Markup {
                fg: (128, 128, 128),
                bg: (255, 255, 255)
            }
        );
        assert_eq!(
            fill.paint(&sample(0.5, 0.0, 1.0, 0.0)),
            Paint::Markup {
                fg: (0, 128, 0),
                bg: (0, 255, 0)
            }
        );
    }

    #[test]
    fn identical_samples_paint_identically() {
        let q = quantizer(ColorDepth::Ansi8);
        let s = sample(0.42, 0.3, 0.6, 0.1);
        assert_eq!(render(&q, &s), render(&q, &s));
    }
}
