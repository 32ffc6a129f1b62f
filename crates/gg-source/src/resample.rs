use gg_core::color::{ColorSample, LuminanceWeights};
use gg_core::error::CoreError;
use gg_core::numeric::round_half_up;
use gg_core::raster::Raster;
use gg_core::source::SourceHeader;
use gg_core::traits::ScanlineSink;

/// Streaming box-filter downsampler.
///
/// Columns are averaged over precomputed windows of decoder samples; rows are
/// accumulated as scanlines arrive and averaged once in [`Resampler::finish`].
/// A scanline is folded into every accumulation row between the previous
/// target row and its own, so upscaled rows are filled by the next scanline.
///
/// # Example
/// ```
/// use gg_core::color::LuminanceWeights;
/// use gg_core::source::SourceHeader;
/// use gg_core::orientation::Orientation;
/// use gg_core::traits::ScanlineSink;
/// use gg_source::resample::Resampler;
///
/// let header = SourceHeader { width: 2, height: 2, channels: 1, orientation: Orientation::Horizontal };
/// let mut r = Resampler::new(1, 1, &header, false, LuminanceWeights::default()).unwrap();
/// r.scanline(&[0, 255], 0, 1).unwrap();
/// r.scanline(&[255, 255], 1, 1).unwrap();
/// let raster = r.finish();
/// assert!((raster.luminance[0] - 0.75).abs() < 1e-6);
/// ```
pub struct Resampler {
    raster: Raster,
    decoded_width: u32,
    decoded_height: u32,
    resize_y: f32,
    last_target: usize,
    next_y: u32,
    weights: LuminanceWeights,
    /// Per-column averages of the current scanline.
    scratch: Vec<ColorSample>,
}

impl Resampler {
    /// Allocate accumulation buffers for a `width × height` grid fed by a
    /// source described by `header`.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] for an empty source, plus the errors of
    /// [`Raster::allocate`].
    pub fn new(
        width: u32,
        height: u32,
        header: &SourceHeader,
        color: bool,
        weights: LuminanceWeights,
    ) -> Result<Self, CoreError> {
        if header.width == 0 || header.height == 0 {
            return Err(CoreError::InvalidDimensions {
                width: header.width,
                height: header.height,
            });
        }
        let mut raster = Raster::allocate(width, height, header.orientation, color)?;

        let span = (header.width - 1) as f32;
        let columns = raster.src_width as f32;
        for (x, slot) in raster.col_lookup.iter_mut().enumerate() {
            *slot = round_half_up(x as f32 * span / columns).max(0) as u32;
        }

        let resize_y = if header.height > 1 {
            (raster.src_height - 1) as f32 / (header.height - 1) as f32
        } else {
            1.0
        };

        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(raster.src_width as usize)
            .map_err(|_| CoreError::AllocationFailure {
                bytes: raster.src_width as usize * size_of::<ColorSample>(),
            })?;
        scratch.resize(raster.src_width as usize, ColorSample::UNSET);

        log::debug!(
            "resampler: source {}×{} ({} canaux) → tampon {}×{}, resize_y={resize_y}",
            header.width,
            header.height,
            header.channels,
            raster.src_width,
            raster.src_height
        );

        Ok(Self {
            raster,
            decoded_width: header.width,
            decoded_height: header.height,
            resize_y,
            last_target: 0,
            next_y: 0,
            weights: weights.normalized(),
            scratch,
        })
    }

    /// Accumulation row targeted by decoder row `y`.
    #[inline(always)]
    fn target_row(&self, y: u32) -> usize {
        let last = self.raster.src_height as usize - 1;
        (round_half_up(self.resize_y * y as f32).max(0) as usize).min(last)
    }

    /// Average one scanline over each column window into `scratch`.
    fn average_columns(&mut self, row: &[u8], channels: u8) {
        let ch = channels as usize;
        let last = self.decoded_width as usize - 1;
        let weights = self.weights;
        for (x, cell) in self.scratch.iter_mut().enumerate() {
            let start = self.raster.col_lookup[x] as usize;
            let end = (self.raster.col_lookup[x + 1] as usize).clamp(start, last);
            let mut sum = ColorSample {
                y: 0.0,
                r: 0.0,
                g: 0.0,
                b: 0.0,
                a: 0.0,
            };
            for px in row[start * ch..(end + 1) * ch].chunks_exact(ch) {
                match *px {
                    [v] => {
                        sum.y += f32::from(v) / 255.0;
                        sum.a += 1.0;
                    }
                    [v, a] => {
                        sum.y += f32::from(v) / 255.0;
                        sum.a += f32::from(a) / 255.0;
                    }
                    [r, g, b] => {
                        sum.y += weights.luminance(r, g, b);
                        sum.r += f32::from(r) / 255.0;
                        sum.g += f32::from(g) / 255.0;
                        sum.b += f32::from(b) / 255.0;
                        sum.a += 1.0;
                    }
                    [r, g, b, a] => {
                        sum.y += weights.luminance(r, g, b);
                        sum.r += f32::from(r) / 255.0;
                        sum.g += f32::from(g) / 255.0;
                        sum.b += f32::from(b) / 255.0;
                        sum.a += f32::from(a) / 255.0;
                    }
                    _ => {}
                }
            }
            let n = (end - start + 1) as f32;
            *cell = ColorSample {
                y: sum.y / n,
                r: sum.r / n,
                g: sum.g / n,
                b: sum.b / n,
                a: sum.a / n,
            };
        }
    }

    /// Add `scratch` into accumulation row `j`.
    fn fold_row(&mut self, j: usize) {
        let Self {
            raster, scratch, ..
        } = self;
        let base = j * raster.src_width as usize;
        let first_fold = raster.row_accum[j] == 0;
        for (x, cell) in scratch.iter().enumerate() {
            let i = base + x;
            raster.luminance[i] += cell.y;
            if let Some(planes) = raster.color.as_mut() {
                planes.red[i] += cell.r;
                planes.green[i] += cell.g;
                planes.blue[i] += cell.b;
            }
            if first_fold {
                raster.alpha[i] = cell.a;
            } else {
                raster.alpha[i] += cell.a;
            }
        }
        raster.row_accum[j] += 1;
    }

    /// Average every accumulation row by its fold count and hand over the
    /// raster. Consumes the resampler, so normalization happens once.
    #[must_use]
    pub fn finish(self) -> Raster {
        let mut raster = self.raster;
        let stride = raster.src_width as usize;
        let mut empty = 0usize;
        for (j, &count) in raster.row_accum.iter().enumerate() {
            if count == 0 {
                empty += 1;
                continue;
            }
            if count == 1 {
                continue;
            }
            let n = count as f32;
            let range = j * stride..(j + 1) * stride;
            scale(&mut raster.luminance[range.clone()], n);
            scale(&mut raster.alpha[range.clone()], n);
            if let Some(planes) = raster.color.as_mut() {
                scale(&mut planes.red[range.clone()], n);
                scale(&mut planes.green[range.clone()], n);
                scale(&mut planes.blue[range], n);
            }
        }
        if empty > 0 {
            log::warn!("{empty} ligne(s) du tampon sans échantillon, flux incomplet ?");
        }
        raster
    }
}

#[inline(always)]
fn scale(values: &mut [f32], n: f32) {
    for v in values {
        *v /= n;
    }
}

impl ScanlineSink for Resampler {
    fn scanline(&mut self, row: &[u8], y: u32, channels: u8) -> Result<(), CoreError> {
        if !(1..=4).contains(&channels) {
            return Err(CoreError::InvalidSourceStream(format!(
                "{channels} canaux par pixel (attendu 1 à 4)"
            )));
        }
        if y >= self.decoded_height {
            return Err(CoreError::InvalidSourceStream(format!(
                "ligne {y} hors de l'image ({} lignes)",
                self.decoded_height
            )));
        }
        if y < self.next_y {
            return Err(CoreError::InvalidSourceStream(format!(
                "ligne {y} reçue après la ligne {}",
                self.next_y
            )));
        }
        let needed = self.decoded_width as usize * channels as usize;
        if row.len() < needed {
            return Err(CoreError::InvalidSourceStream(format!(
                "ligne {y} trop courte : {} octets, {needed} attendus",
                row.len()
            )));
        }

        self.average_columns(row, channels);
        let target = self.target_row(y);
        for j in self.last_target..=target {
            self.fold_row(j);
        }
        // The last source row also fills any rows below its target.
        if y + 1 == self.decoded_height {
            for j in target + 1..self.raster.src_height as usize {
                self.fold_row(j);
            }
        }
        self.last_target = target;
        self.next_y = y;
        Ok(())
    }
}
