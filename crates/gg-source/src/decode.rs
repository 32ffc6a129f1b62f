use std::io::{Cursor, Read};

use anyhow::{Context, Result, anyhow};
use image::{ColorType, DynamicImage, ImageDecoder, ImageFormat, ImageReader};

use gg_core::error::CoreError;
use gg_core::orientation::Orientation;
use gg_core::source::SourceHeader;
use gg_core::traits::ScanlineSink;

/// Formats tried, in order, when the sniffed format fails or is unknown.
pub const FALLBACK_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::Bmp,
];

/// Image décodée en 8 bits par canal, prête à être diffusée ligne par ligne.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    header: SourceHeader,
    format: ImageFormat,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Dimensions, channel layout and orientation.
    #[must_use]
    pub fn header(&self) -> SourceHeader {
        self.header
    }

    /// Format that succeeded.
    #[must_use]
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Feed every row, top to bottom, into `sink`. `progress` receives
    /// `(rows done, total rows)` after each one.
    ///
    /// # Errors
    /// Propagates the sink's error and stops at the first failing row.
    pub fn stream_into<S, P>(&self, sink: &mut S, mut progress: P) -> Result<(), CoreError>
    where
        S: ScanlineSink + ?Sized,
        P: FnMut(u32, u32),
    {
        let SourceHeader {
            width,
            height,
            channels,
            ..
        } = self.header;
        let stride = width as usize * channels as usize;
        for (y, row) in self.pixels.chunks_exact(stride).enumerate() {
            sink.scanline(row, y as u32, channels)?;
            progress(y as u32 + 1, height);
        }
        Ok(())
    }
}

/// Décodeur avec repli : essaie une liste ordonnée de formats sur la même
/// entrée en mémoire.
///
/// # Example
/// ```
/// use gg_source::decode::DecodeService;
/// let service = DecodeService::default();
/// assert!(service.decode(b"definitely not an image").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct DecodeService {
    formats: Vec<ImageFormat>,
}

impl Default for DecodeService {
    fn default() -> Self {
        Self {
            formats: FALLBACK_FORMATS.to_vec(),
        }
    }
}

impl DecodeService {
    /// Service trying `formats` in order.
    #[must_use]
    pub fn with_formats(formats: Vec<ImageFormat>) -> Self {
        Self { formats }
    }

    /// Attempt order for `bytes`: the sniffed format first, then the
    /// fallback list without duplicates.
    #[must_use]
    pub fn attempts(&self, bytes: &[u8]) -> Vec<ImageFormat> {
        let mut order = Vec::with_capacity(self.formats.len() + 1);
        if let Ok(guessed) = image::guess_format(bytes) {
            order.push(guessed);
        }
        for &fmt in &self.formats {
            if !order.contains(&fmt) {
                order.push(fmt);
            }
        }
        order
    }

    /// Decode an in-memory image.
    ///
    /// # Errors
    /// Returns the last decoder error when every format fails, or
    /// [`CoreError::UnsupportedSampleDepth`] for floating-point images.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
        let mut last_err = None;
        for format in self.attempts(bytes) {
            match decode_as(bytes, format) {
                Ok(img) => return Ok(img),
                Err(e) if e.downcast_ref::<CoreError>().is_some() => return Err(e),
                Err(e) => {
                    log::debug!("décodage {format:?} échoué : {e:#}");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| anyhow!("aucun format à essayer"))
            .context("Aucun décodeur n'a reconnu l'image"))
    }

    /// Read `input` (a path, or `-` for stdin) and decode it.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read or decoded.
    pub fn open(&self, input: &str) -> Result<DecodedImage> {
        let bytes = read_input(input)?;
        self.decode(&bytes)
            .with_context(|| format!("Impossible de décoder {input}"))
    }
}

/// Read a whole input into memory. `-` reads standard input.
///
/// # Errors
/// Returns an error if the file or stdin cannot be read.
pub fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("Impossible de lire l'entrée standard")?;
        return Ok(buf);
    }
    std::fs::read(input).with_context(|| format!("Impossible de charger {input}"))
}

/// One decode attempt with a forced format.
fn decode_as(bytes: &[u8], format: ImageFormat) -> Result<DecodedImage> {
    let mut decoder = ImageReader::with_format(Cursor::new(bytes), format).into_decoder()?;
    let orientation = match decoder.orientation() {
        Ok(o) => Orientation::from_exif(u16::from(o.to_exif())),
        Err(e) => {
            log::debug!("orientation illisible ({e}), Horizontal par défaut");
            Orientation::Horizontal
        }
    };
    let img = DynamicImage::from_decoder(decoder)?;
    let (width, height) = (img.width(), img.height());
    let (channels, pixels) = into_samples(img)?;
    if width == 0 || height == 0 {
        return Err(CoreError::InvalidDimensions { width, height }.into());
    }
    Ok(DecodedImage {
        header: SourceHeader {
            width,
            height,
            channels,
            orientation,
        },
        format,
        pixels,
    })
}

/// Convert to interleaved 8-bit samples, keeping gray/alpha layout.
fn into_samples(img: DynamicImage) -> Result<(u8, Vec<u8>), CoreError> {
    let color = img.color();
    if matches!(color, ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16) {
        log::debug!("{color:?} ramené à 8 bits par canal");
    }
    let (channels, pixels) = match color {
        ColorType::L8 | ColorType::L16 => (1, img.into_luma8().into_raw()),
        ColorType::La8 | ColorType::La16 => (2, img.into_luma_alpha8().into_raw()),
        ColorType::Rgb8 | ColorType::Rgb16 => (3, img.into_rgb8().into_raw()),
        ColorType::Rgb32F | ColorType::Rgba32F => {
            return Err(CoreError::UnsupportedSampleDepth { bits: 32 });
        }
        _ => (4, img.into_rgba8().into_raw()),
    };
    Ok((channels, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    struct Rows(Vec<(u32, usize, u8)>);

    impl ScanlineSink for Rows {
        fn scanline(&mut self, row: &[u8], y: u32, channels: u8) -> Result<(), CoreError> {
            self.0.push((y, row.len(), channels));
            Ok(())
        }
    }

    #[test]
    fn sniffed_format_is_tried_first() {
        let png = encode(
            DynamicImage::ImageLuma8(GrayImage::new(2, 2)),
            ImageFormat::Png,
        );
        let order = DecodeService::default().attempts(&png);
        assert_eq!(order[0], ImageFormat::Png);
        assert_eq!(order.len(), FALLBACK_FORMATS.len());
    }

    #[test]
    fn gray_png_keeps_one_channel() {
        let img = GrayImage::from_pixel(4, 3, Luma([10]));
        let bytes = encode(DynamicImage::ImageLuma8(img), ImageFormat::Png);
        let decoded = DecodeService::default().decode(&bytes).unwrap();
        let h = decoded.header();
        assert_eq!((h.width, h.height, h.channels), (4, 3, 1));
        assert_eq!(h.orientation, Orientation::Horizontal);
        assert_eq!(decoded.format(), ImageFormat::Png);
    }

    #[test]
    fn rgba_png_streams_every_row() {
        let img = RgbaImage::from_pixel(5, 4, Rgba([1, 2, 3, 4]));
        let bytes = encode(DynamicImage::ImageRgba8(img), ImageFormat::Png);
        let decoded = DecodeService::default().decode(&bytes).unwrap();
        let mut rows = Rows(Vec::new());
        let mut ticks = Vec::new();
        decoded
            .stream_into(&mut rows, |done, total| ticks.push((done, total)))
            .unwrap();
        assert_eq!(rows.0, vec![(0, 20, 4), (1, 20, 4), (2, 20, 4), (3, 20, 4)]);
        assert_eq!(ticks.last(), Some(&(4, 4)));
    }

    #[test]
    fn sixteen_bit_png_is_reduced_to_eight() {
        let img: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(2, 2, Luma([65535]));
        let bytes = encode(DynamicImage::ImageLuma16(img), ImageFormat::Png);
        let decoded = DecodeService::default().decode(&bytes).unwrap();
        assert_eq!(decoded.header().channels, 1);
        assert!(decoded.pixels.iter().all(|&v| v == 255));
    }

    #[test]
    fn unknown_bytes_try_the_whole_chain() {
        let service = DecodeService::with_formats(vec![ImageFormat::Jpeg, ImageFormat::Bmp]);
        assert_eq!(
            service.attempts(b"plain text, no magic"),
            vec![ImageFormat::Jpeg, ImageFormat::Bmp]
        );
    }

    #[test]
    fn custom_chain_decodes_bmp() {
        let img = RgbImage::from_pixel(3, 3, Rgb([200, 10, 10]));
        let bytes = encode(DynamicImage::ImageRgb8(img), ImageFormat::Bmp);
        let service = DecodeService::with_formats(vec![ImageFormat::Jpeg, ImageFormat::Bmp]);
        let decoded = service.decode(&bytes).unwrap();
        assert_eq!(decoded.format(), ImageFormat::Bmp);
        assert_eq!(decoded.header().channels, 3);
    }

    #[test]
    fn garbage_fails_every_format() {
        let err = DecodeService::default().decode(b"plain text, no magic here at all").unwrap_err();
        assert!(format!("{err:#}").contains("Aucun décodeur"));
    }

    #[test]
    fn float_images_are_rejected() {
        let img = DynamicImage::new_rgb32f(1, 1);
        assert!(matches!(
            into_samples(img),
            Err(CoreError::UnsupportedSampleDepth { bits: 32 })
        ));
    }

    #[test]
    fn open_reads_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.jpg");
        RgbImage::from_pixel(8, 8, Rgb([128, 128, 128]))
            .save_with_format(&path, ImageFormat::Jpeg)
            .unwrap();
        let decoded = DecodeService::default()
            .open(path.to_str().unwrap())
            .unwrap();
        assert_eq!(decoded.format(), ImageFormat::Jpeg);
        assert_eq!(decoded.header().width, 8);
    }

    #[test]
    fn missing_file_names_the_input() {
        let err = DecodeService::default().open("/nonexistent/x.png").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/x.png"));
    }
}
