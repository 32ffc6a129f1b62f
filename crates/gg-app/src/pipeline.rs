use std::io::{self, Write};

use anyhow::{Context, Result};
use gg_ascii::dimensions::{DimensionPlan, PlanRequest, plan};
use gg_ascii::renderer::Renderer;
use gg_core::config::{OutputMode, RenderConfig};
use gg_core::error::CoreError;
use gg_core::raster::Raster;
use gg_core::source::SourceHeader;
use gg_render::markup::{Dialect, MarkupSink};
use gg_render::terminal::TerminalSink;
use gg_source::decode::DecodeService;
use gg_source::resample::Resampler;

/// Progress bar length, brackets included.
const BAR_LEN: usize = 56;

/// Decoding progress on stderr, redrawn only when a cell fills up.
struct Progress {
    enabled: bool,
    cells: usize,
}

impl Progress {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            cells: usize::MAX,
        }
    }

    fn update(&mut self, done: u32, total: u32) {
        if !self.enabled || total == 0 {
            return;
        }
        let width = BAR_LEN - 2;
        let cells = (done as usize * width) / total as usize;
        if cells == self.cells {
            return;
        }
        self.cells = cells;
        eprint!(
            "Decompressing image [{}{}]\r",
            "#".repeat(cells),
            ".".repeat(width - cells)
        );
    }

    fn finish(&self) {
        if self.enabled && self.cells != usize::MAX {
            eprintln!();
        }
    }
}

fn print_source_info(header: &SourceHeader) {
    eprintln!("Source width: {}", header.width);
    eprintln!("Source height: {}", header.height);
    eprintln!("Source color components: {}", header.channels);
    eprintln!(
        "Orientation: {} ({})",
        header.orientation.exif(),
        header.orientation.label()
    );
}

fn print_output_info(plan: &DimensionPlan, renderer: &Renderer) {
    eprintln!("Output width: {}", plan.width);
    eprintln!("Output height: {}", plan.height);
    let palette = renderer.palette();
    eprintln!(
        "Output palette ({} chars): '{}'",
        palette.len(),
        palette.as_str()
    );
}

/// Decode `input`, plan the grid and resample it.
///
/// Returns `Ok(None)` when the planned grid is empty: the image is skipped.
///
/// # Errors
/// Returns an error if the input cannot be read, decoded or resampled.
pub fn prepare(
    service: &DecodeService,
    renderer: &Renderer,
    input: &str,
    config: &RenderConfig,
    term: (u32, u32),
) -> Result<Option<Raster>> {
    let image = service.open(input)?;
    let header = image.header();
    log::info!(
        "{input} : {}×{} ({:?}), {} canaux, orientation {}",
        header.width,
        header.height,
        image.format(),
        header.channels,
        header.orientation.exif()
    );
    if config.verbose {
        print_source_info(&header);
    }

    let request = PlanRequest {
        source_width: header.width,
        source_height: header.height,
        switch_axes: header.orientation.switches_axes(),
        term_width: term.0,
        term_height: term.1,
        width: config.width,
        height: config.height,
        fit: config.fit,
        border: config.border,
    };
    let grid = match plan(&request) {
        Ok(grid) => grid,
        Err(CoreError::DegenerateDimension { width, height }) => {
            log::warn!("{input} : grille {width}×{height} vide, image ignorée.");
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("Dimensions invalides pour {input}")),
    };
    if config.verbose {
        print_output_info(&grid, renderer);
    }

    let mut resampler = Resampler::new(
        grid.width,
        grid.height,
        &header,
        config.color_depth.is_color(),
        config.luminance,
    )?;
    let mut progress = Progress::new(config.verbose);
    image
        .stream_into(&mut resampler, |done, total| progress.update(done, total))
        .with_context(|| format!("Flux de lignes invalide pour {input}"))?;
    progress.finish();
    Ok(Some(resampler.finish()))
}

/// Convert every input and write the grids to `out`, in order.
///
/// Markup output gets one document per image unless `markup_raw` is set.
///
/// # Errors
/// Stops at the first input that cannot be converted or written.
pub fn run<W: Write>(
    inputs: &[String],
    config: &RenderConfig,
    term: (u32, u32),
    out: W,
) -> Result<W> {
    let service = DecodeService::default();
    let renderer = Renderer::new(config, term.0, term.1)?;

    match config.output {
        OutputMode::Terminal => {
            let mut sink = TerminalSink::new(out);
            for input in inputs {
                if let Some(raster) = prepare(&service, &renderer, input, config, term)? {
                    renderer.render(&raster, &mut sink).context(write_error(input))?;
                }
            }
            sink.finish()
        }
        OutputMode::Html | OutputMode::Xhtml => {
            let dialect = if config.output == OutputMode::Html {
                Dialect::Html
            } else {
                Dialect::Xhtml
            };
            let mut sink = MarkupSink::new(out, dialect, config.fill);
            for input in inputs {
                let Some(raster) = prepare(&service, &renderer, input, config, term)? else {
                    continue;
                };
                write_document(&renderer, &raster, config, &mut sink)
                    .context(write_error(input))?;
            }
            sink.finish()
        }
    }
}

fn write_document<W: Write>(
    renderer: &Renderer,
    raster: &Raster,
    config: &RenderConfig,
    sink: &mut MarkupSink<W>,
) -> io::Result<()> {
    if !config.markup_raw {
        sink.begin(&config.html)?;
    }
    renderer.render(raster, sink)?;
    if !config.markup_raw {
        sink.end()?;
    }
    Ok(())
}

fn write_error(input: &str) -> String {
    format!("Impossible d'écrire le rendu de {input}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gg_core::color::LuminanceWeights;
    use gg_core::config::ColorDepth;
    use gg_core::orientation::Orientation;
    use gg_core::traits::ScanlineSink;
    use image::{GrayImage, Luma};

    fn write_checker(dir: &tempfile::TempDir) -> String {
        // Dark top-left and bottom-right quadrants.
        let img = GrayImage::from_fn(100, 100, |x, y| {
            Luma([if (x < 50) == (y < 50) { 0 } else { 255 }])
        });
        let path = dir.path().join("checker.png");
        img.save(&path).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config() -> RenderConfig {
        RenderConfig {
            palette: " .:#".into(),
            width: Some(2),
            height: Some(2),
            ..RenderConfig::default()
        }
    }

    fn run_to_string(inputs: &[String], config: &RenderConfig) -> String {
        String::from_utf8(run(inputs, config, (80, 25), Vec::new()).unwrap()).unwrap()
    }

    #[test]
    fn png_renders_as_checkerboard() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_checker(&dir);
        assert_eq!(run_to_string(&[input], &config()), "# \n #\n");
    }

    #[test]
    fn inputs_are_rendered_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_checker(&dir);
        let c = RenderConfig {
            invert: true,
            ..config()
        };
        assert_eq!(
            run_to_string(&[input.clone(), input], &c),
            " #\n# \n #\n# \n"
        );
    }

    #[test]
    fn html_output_wraps_each_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_checker(&dir);
        let c = RenderConfig {
            output: OutputMode::Html,
            color_depth: ColorDepth::TrueColor,
            ..config()
        };
        let out = run_to_string(&[input], &c);
        assert!(out.starts_with("<!DOCTYPE html>"));
        assert_eq!(out.matches("<span").count(), 4);
        assert_eq!(out.matches("<br>\n").count(), 2);
        assert!(!out.contains('\x1b'));
        assert!(out.ends_with("</html>\n"));
    }

    #[test]
    fn raw_markup_has_no_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_checker(&dir);
        let c = RenderConfig {
            output: OutputMode::Xhtml,
            markup_raw: true,
            ..config()
        };
        assert_eq!(run_to_string(&[input], &c), "# <br/>\n #<br/>\n");
    }

    #[test]
    fn flat_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let img = GrayImage::from_pixel(100, 1, Luma([0]));
        let path = dir.path().join("line.png");
        img.save(&path).unwrap();
        let c = RenderConfig {
            palette: " #".into(),
            ..RenderConfig::default()
        };
        let input = path.to_string_lossy().into_owned();
        assert_eq!(run_to_string(&[input], &c), "");
    }

    /// Stored 40×20 image of 10×10 blocks, white where `BLOCKS` is set,
    /// resampled onto its 2×4 display grid and rendered with `" #"`.
    fn render_rotated(orientation: Orientation) -> String {
        const BLOCKS: [[u8; 4]; 2] = [[1, 0, 0, 0], [1, 1, 1, 0]];
        let header = SourceHeader {
            width: 40,
            height: 20,
            channels: 1,
            orientation,
        };
        let mut resampler =
            Resampler::new(2, 4, &header, false, LuminanceWeights::default()).unwrap();
        for y in 0..20 {
            let row: Vec<u8> = (0..40)
                .map(|x| BLOCKS[y / 10][x / 10] * 255)
                .collect();
            resampler.scanline(&row, y as u32, 1).unwrap();
        }
        let config = RenderConfig {
            palette: " #".into(),
            ..RenderConfig::default()
        };
        let mut out = String::new();
        Renderer::new(&config, 80, 25)
            .unwrap()
            .render(&resampler.finish(), &mut out)
            .unwrap();
        out
    }

    #[test]
    fn rotate90_source_renders_turned() {
        assert_eq!(render_rotated(Orientation::Rotate90), "##\n# \n# \n  \n");
    }

    #[test]
    fn transposed_source_renders_mirrored_diagonally() {
        assert_eq!(
            render_rotated(Orientation::MirrorHorizontalRotate90),
            "  \n# \n# \n##\n"
        );
    }

    #[test]
    fn missing_input_is_an_error() {
        let err = run(&["/nonexistent/x.png".to_string()], &config(), (80, 25), Vec::new())
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/x.png"));
    }
}
