//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Tags | custom [`exif_parser`](super::exif_parser) over the same bytes |
//! | Rotate | `DynamicImage::rotate90` / `rotate180` / `rotate270` |
//! | Resample | `image::imageops::resize` with `CatmullRom` (bicubic) |
//! | Composite | `image::imageops::overlay` onto an RGBA canvas (clips off-canvas pixels) |
//! | Encode → JPEG / AVIF | `JpegEncoder` / `AvifEncoder` with quality |
//! | Encode → PNG, GIF, BMP, TIFF, WebP | `DynamicImage::write_to` (lossless) |

use super::backend::{Dimensions, ImageBackend, ImagingError, SourceImage};
use super::exif_parser;
use super::params::{ComposeParams, EncodeParams, OutputFormat, Rotation};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Bicubic resampling; the quality bar for every redraw.
const RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

/// AVIF encoder speed (1 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode raster bytes, sniffing the container from its magic bytes.
fn load_image(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), ImagingError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImagingError::InvalidImage(format!("Failed to read image: {e}")))?;
    let format = reader
        .format()
        .ok_or_else(|| ImagingError::InvalidImage("Unrecognized image format".into()))?;
    let img = reader
        .decode()
        .map_err(|e| ImagingError::InvalidImage(format!("Failed to decode {format:?}: {e}")))?;
    Ok((img, format))
}

/// Resample `img` to exactly `size`, skipping the work when it already matches.
fn redraw(img: &DynamicImage, size: Dimensions) -> RgbaImage {
    if img.width() == size.width && img.height() == size.height {
        img.to_rgba8()
    } else {
        imageops::resize(&img.to_rgba8(), size.width, size.height, RESAMPLE_FILTER)
    }
}

/// Encode into an in-memory buffer.
fn save_image(img: &DynamicImage, params: &EncodeParams) -> Result<Vec<u8>, ImagingError> {
    let quality = params.quality.value().min(100) as u8;
    let mut buffer = Cursor::new(Vec::new());

    let result = match params.format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel: transparent areas flatten to black
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality))
        }
        OutputFormat::Avif => img.write_with_encoder(AvifEncoder::new_with_speed_quality(
            &mut buffer,
            AVIF_SPEED,
            quality,
        )),
        OutputFormat::Png => img.write_to(&mut buffer, ImageFormat::Png),
        OutputFormat::Gif => img.write_to(&mut buffer, ImageFormat::Gif),
        OutputFormat::Bmp => img.write_to(&mut buffer, ImageFormat::Bmp),
        OutputFormat::Tiff => img.write_to(&mut buffer, ImageFormat::Tiff),
        OutputFormat::WebP => img.write_to(&mut buffer, ImageFormat::WebP),
    };

    result.map_err(|e| {
        ImagingError::Encode(format!("{} encode failed: {}", params.format.mime_type(), e))
    })?;
    Ok(buffer.into_inner())
}

impl ImageBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, ImagingError> {
        let (pixels, format) = load_image(bytes)?;
        let tags = exif_parser::read_tags(bytes);
        debug!(
            ?format,
            width = pixels.width(),
            height = pixels.height(),
            tags = tags.len(),
            "decoded image"
        );
        Ok(SourceImage::new(pixels, tags))
    }

    fn rotate(&self, source: SourceImage, rotation: Rotation) -> SourceImage {
        let SourceImage { pixels, tags } = source;
        let pixels = match rotation {
            Rotation::None => pixels,
            Rotation::Cw90 => pixels.rotate90(),
            Rotation::Cw180 => pixels.rotate180(),
            Rotation::Cw270 => pixels.rotate270(),
        };
        SourceImage::new(pixels, tags)
    }

    fn compose(
        &self,
        source: &SourceImage,
        params: &ComposeParams,
    ) -> Result<SourceImage, ImagingError> {
        let geometry = params.geometry;
        // Nothing to resample or pad: a transparent canvas under the source
        // is the source itself
        if params.background.is_none() && geometry.is_identity(source.dimensions()) {
            return Ok(SourceImage::new(
                DynamicImage::ImageRgba8(source.pixels.to_rgba8()),
                source.tags.clone(),
            ));
        }

        let fill = params.background.map(|c| c.to_rgba()).unwrap_or([0; 4]);
        let mut canvas = RgbaImage::from_pixel(
            geometry.canvas.width,
            geometry.canvas.height,
            Rgba(fill),
        );

        if !geometry.redraw.is_empty() && !geometry.canvas.is_empty() {
            let drawn = redraw(&source.pixels, geometry.redraw);
            let (x, y) = geometry.offset();
            // Pixels that land outside the canvas are dropped by overlay
            imageops::overlay(&mut canvas, &drawn, x, y);
        }

        Ok(SourceImage::new(
            DynamicImage::ImageRgba8(canvas),
            source.tags.clone(),
        ))
    }

    fn encode(&self, image: &SourceImage, params: &EncodeParams) -> Result<Vec<u8>, ImagingError> {
        save_image(&image.pixels, params)
    }
}
