use std::io;

use gg_core::color::ColorSample;
use gg_core::config::RenderConfig;
use gg_core::error::CoreError;
use gg_core::orientation::Transform;
use gg_core::palette::Palette;
use gg_core::raster::Raster;
use gg_core::traits::OutputSink;

use crate::color_map::Quantizer;
use crate::edge::{EdgeClass, EdgeOptions, gradient};
use crate::luminance::palette_index;

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[0;0H";

/// Terminal placement of the grid.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Pad rows to center horizontally.
    pub center_x: bool,
    /// Pad above and below to center vertically.
    pub center_y: bool,
    /// Frame the grid with `+`, `-` and `|`.
    pub border: bool,
    /// Clear the screen first.
    pub clear_screen: bool,
    /// Terminal width, in cells.
    pub term_width: u32,
    /// Terminal height, in cells.
    pub term_height: u32,
}

/// Leading spaces that center a `width`-column grid.
///
/// # Example
/// ```
/// use gg_ascii::renderer::horizontal_margin;
/// assert_eq!(horizontal_margin(80, 10, false), 35);
/// assert_eq!(horizontal_margin(80, 10, true), 34);
/// assert_eq!(horizontal_margin(10, 20, false), 0);
/// ```
#[must_use]
pub fn horizontal_margin(term_width: u32, width: u32, border: bool) -> usize {
    let total = i64::from(term_width) - i64::from(width) - if border { 2 } else { 0 };
    if total <= 0 { 0 } else { (total / 2) as usize }
}

/// Blank lines above and below a `height`-row grid: `floor(total/2)` and
/// `ceil(total/2)`.
///
/// # Example
/// ```
/// use gg_ascii::renderer::vertical_margins;
/// assert_eq!(vertical_margins(25, 20, false), (2, 3));
/// assert_eq!(vertical_margins(25, 20, true), (1, 2));
/// assert_eq!(vertical_margins(20, 25, false), (0, 0));
/// ```
#[must_use]
pub fn vertical_margins(term_height: u32, height: u32, border: bool) -> (usize, usize) {
    let total = i64::from(term_height) - i64::from(height) - if border { 2 } else { 0 };
    if total <= 0 {
        (0, 0)
    } else {
        let top = total / 2;
        (top as usize, (total - top) as usize)
    }
}

/// Writes a normalized [`Raster`] as rows of glyphs.
///
/// # Example
/// ```
/// use gg_ascii::renderer::Renderer;
/// use gg_core::color::ColorSample;
/// use gg_core::config::RenderConfig;
/// use gg_core::raster::Raster;
///
/// let cell = |y| ColorSample { y, r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
/// let raster = Raster::from_samples(2, 2, &[cell(0.0), cell(1.0), cell(1.0), cell(0.0)]).unwrap();
/// let config = RenderConfig { palette: " .:#".into(), ..RenderConfig::default() };
/// let renderer = Renderer::new(&config, 80, 25).unwrap();
/// let mut out = String::new();
/// renderer.render(&raster, &mut out).unwrap();
/// assert_eq!(out, "# \n #\n");
/// ```
#[derive(Clone, Debug)]
pub struct Renderer {
    palette: Palette,
    quantizer: Quantizer,
    edges: Option<EdgeOptions>,
    invert: bool,
    flip_x: bool,
    flip_y: bool,
    terminal: bool,
    layout: Layout,
}

impl Renderer {
    /// Build a renderer from the configuration and the resolved terminal size.
    ///
    /// # Errors
    /// [`CoreError::Config`] if the palette is empty.
    pub fn new(config: &RenderConfig, term_width: u32, term_height: u32) -> Result<Self, CoreError> {
        let terminal = !config.output.is_markup();
        Ok(Self {
            palette: config.build_palette()?,
            quantizer: Quantizer {
                depth: config.color_depth,
                fill: config.fill,
                grayscale: config.grayscale,
                markup: !terminal,
            },
            edges: (config.edges || config.edges_only).then_some(EdgeOptions {
                threshold: config.edge_threshold,
                only: config.edges_only,
            }),
            invert: config.invert,
            flip_x: config.flip_x,
            flip_y: config.flip_y,
            terminal,
            layout: Layout {
                center_x: config.center_x,
                center_y: config.center_y,
                border: config.border,
                clear_screen: config.clear_screen,
                term_width,
                term_height,
            },
        })
    }

    /// Palette in use.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn transform(&self, raster: &Raster) -> Transform {
        Transform {
            orientation: raster.orientation,
            flip_x: self.flip_x,
            flip_y: self.flip_y,
        }
    }

    /// Glyph for grid cell `(x, y)` holding `sample`.
    #[inline(always)]
    fn glyph(&self, raster: &Raster, transform: &Transform, sample: &ColorSample, x: u32, y: u32) -> &str {
        let class = self
            .edges
            .map_or(EdgeClass::Flat, |opts| opts.classify(gradient(raster, transform, x, y)));
        let levels = self.palette.levels();
        match class {
            EdgeClass::Edge(glyph) => glyph,
            EdgeClass::Flat => self
                .palette
                .glyph(palette_index(levels, sample.y, sample.a, self.invert, false)),
            EdgeClass::Blank => self
                .palette
                .glyph(palette_index(levels, sample.y, sample.a, self.invert, true)),
        }
    }

    /// Write the whole grid: optional clear screen, margins, border and rows.
    ///
    /// Document wrapping for markup output is the caller's job.
    ///
    /// # Errors
    /// Propagates sink write errors.
    pub fn render<S: OutputSink + ?Sized>(&self, raster: &Raster, sink: &mut S) -> io::Result<()> {
        let Layout {
            center_x,
            center_y,
            border,
            clear_screen,
            term_width,
            term_height,
        } = self.layout;
        let margin = if self.terminal && center_x {
            " ".repeat(horizontal_margin(term_width, raster.width, border))
        } else {
            String::new()
        };
        let (top, bottom) = if self.terminal && center_y {
            vertical_margins(term_height, raster.height, border)
        } else {
            (0, 0)
        };
        log::debug!(
            "rendu {}×{}, marges x={} haut={top} bas={bottom}",
            raster.width,
            raster.height,
            margin.len()
        );

        if self.terminal && clear_screen {
            sink.write_str(CLEAR_SCREEN)?;
        }
        for _ in 0..top {
            sink.line_end()?;
        }
        if border {
            self.border_line(raster.width, &margin, sink)?;
        }

        let transform = self.transform(raster);
        for y in 0..raster.height {
            if self.quantizer.depth.is_color() {
                self.color_row(raster, &transform, y, &margin, sink)?;
            } else {
                self.plain_row(raster, &transform, y, &margin, sink)?;
            }
        }

        if border {
            self.border_line(raster.width, &margin, sink)?;
        }
        for _ in 0..bottom {
            sink.line_end()?;
        }
        Ok(())
    }

    fn border_line<S: OutputSink + ?Sized>(&self, width: u32, margin: &str, sink: &mut S) -> io::Result<()> {
        sink.write_str(margin)?;
        sink.write_str(&format!("+{}+", "-".repeat(width as usize)))?;
        sink.line_end()
    }

    fn plain_row<S: OutputSink + ?Sized>(
        &self,
        raster: &Raster,
        transform: &Transform,
        y: u32,
        margin: &str,
        sink: &mut S,
    ) -> io::Result<()> {
        let border = self.layout.border;
        sink.write_str(margin)?;
        if border {
            sink.write_str("|")?;
        }
        for x in 0..raster.width {
            let sample = raster.sample(raster.index(transform, x, y));
            sink.glyph(self.glyph(raster, transform, &sample, x, y))?;
        }
        if border {
            sink.write_str("|")?;
        }
        sink.line_end()
    }

    fn color_row<S: OutputSink + ?Sized>(
        &self,
        raster: &Raster,
        transform: &Transform,
        y: u32,
        margin: &str,
        sink: &mut S,
    ) -> io::Result<()> {
        let border = self.layout.border;
        if self.terminal {
            sink.write_str(RESET)?;
        }
        sink.write_str(margin)?;
        if border {
            sink.write_str("|")?;
        }

        let mut previous = ColorSample::UNSET;
        for x in 0..raster.width {
            let sample = raster.sample(raster.index(transform, x, y));
            let glyph = self.glyph(raster, transform, &sample, x, y);
            if self.terminal {
                let key = sample.premultiplied();
                if key == previous {
                    sink.glyph(glyph)?;
                    continue;
                }
                previous = key;
            }
            self.quantizer.paint(&sample).write(sink, glyph)?;
        }

        if self.terminal {
            sink.write_str(RESET)?;
        }
        if border {
            sink.write_str("|")?;
        }
        sink.line_end()
    }
}
