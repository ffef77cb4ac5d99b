//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They take a
//! request, compute parameters, and call the backend. A full request runs:
//!
//! ```text
//! bytes ─decode─▶ SourceImage ─correct_orientation─▶ ─resize─▶ canvas ─encode─▶ TransformResult
//! ```
//!
//! Each step consumes its input and returns a new value, so intermediate
//! pixel buffers are dropped as soon as the next one exists, on error paths
//! included.

use super::backend::{Dimensions, ImageBackend, ImageMetadata, ImagingError, SourceImage};
use super::calculations::resolve;
use super::params::{
    Color, ComposeParams, EncodeParams, OutputFormat, Quality, ResizePolicy, ResizeSpec, Rotation,
};
use tracing::{debug, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Mime type used when a requested one has no encoder.
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Largest buffer a resize may allocate, in pixels (400 MB of RGBA).
pub const MAX_PIXELS: u64 = 100_000_000;

/// Encoded output of a transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub quality: Quality,
}

/// Decode raster bytes. Empty input and zero-sized images are rejected.
pub fn decode(backend: &impl ImageBackend, bytes: &[u8]) -> Result<SourceImage> {
    if bytes.is_empty() {
        return Err(ImagingError::InvalidImage("empty input".into()));
    }
    let source = backend.decode(bytes)?;
    let dims = source.dimensions();
    if dims.is_empty() {
        return Err(ImagingError::InvalidImage(format!(
            "image has no pixels ({dims})"
        )));
    }
    Ok(source)
}

/// Rotate the image upright according to its orientation tag.
///
/// The returned image carries an orientation of 1 (normal), so applying the
/// correction again is a no-op. Images without the tag are returned as-is.
pub fn correct_orientation(backend: &impl ImageBackend, source: SourceImage) -> SourceImage {
    let Some(value) = source.tags.orientation() else {
        return source;
    };
    let tags = source.tags.with_normal_orientation();
    let rotation = Rotation::from_orientation(value);

    let mut corrected = if rotation == Rotation::None {
        source
    } else {
        debug!(orientation = value, ?rotation, "correcting orientation");
        backend.rotate(source, rotation)
    };
    corrected.tags = tags;
    corrected
}

/// Rotate clockwise, leaving the tags alone.
pub fn rotate(backend: &impl ImageBackend, source: SourceImage, rotation: Rotation) -> SourceImage {
    backend.rotate(source, rotation)
}

/// Redraw the image onto a new canvas as described by `spec`.
///
/// Fails with [`ImagingError::TooLarge`] when the canvas or the resampled
/// image would exceed [`MAX_PIXELS`].
pub fn resize(
    backend: &impl ImageBackend,
    source: SourceImage,
    spec: &ResizeSpec,
) -> Result<SourceImage> {
    let from = source.dimensions();
    let geometry = resolve(from, spec);
    debug!(
        policy = spec.policy.name(),
        source = %from,
        redraw = %geometry.redraw,
        canvas = %geometry.canvas,
        "resolved geometry"
    );
    for size in [geometry.canvas, geometry.redraw] {
        if size.area() > MAX_PIXELS {
            return Err(ImagingError::TooLarge(size));
        }
    }
    backend.compose(
        &source,
        &ComposeParams {
            geometry,
            background: spec.background,
        },
    )
}

/// Fit the image into `size`, filling the uncovered area with `background`.
pub fn pad_to(
    backend: &impl ImageBackend,
    source: SourceImage,
    size: Dimensions,
    background: Color,
) -> Result<SourceImage> {
    let spec = ResizeSpec::new(ResizePolicy::Fit, size.width, size.height)
        .with_background(Some(background));
    resize(backend, source, &spec)
}

/// Pad the image to a square of its longer side.
pub fn pad(backend: &impl ImageBackend, source: SourceImage, background: Color) -> Result<SourceImage> {
    let Dimensions { width, height } = source.dimensions();
    let side = width.max(height);
    pad_to(backend, source, Dimensions::new(side, side), background)
}

/// Serialize an image with the encoder registered for `mime_type`.
///
/// Fails with [`ImagingError::UnsupportedFormat`] when no encoder matches;
/// the quality only affects lossy formats.
pub fn encode(
    backend: &impl ImageBackend,
    image: &SourceImage,
    quality: Quality,
    mime_type: &str,
) -> Result<TransformResult> {
    let format = OutputFormat::from_mime(mime_type)
        .ok_or_else(|| ImagingError::UnsupportedFormat(mime_type.to_string()))?;
    let bytes = backend.encode(image, &EncodeParams { format, quality })?;
    debug!(
        mime_type = format.mime_type(),
        quality = quality.value(),
        lossy = format.is_lossy(),
        bytes = bytes.len(),
        "encoded image"
    );
    Ok(TransformResult {
        bytes,
        mime_type: format.mime_type(),
        quality,
    })
}

/// Like [`encode`], but falls back to [`DEFAULT_MIME_TYPE`] when the
/// requested mime type has no encoder.
pub fn encode_or_default(
    backend: &impl ImageBackend,
    image: &SourceImage,
    quality: Quality,
    mime_type: &str,
) -> Result<TransformResult> {
    match encode(backend, image, quality, mime_type) {
        Err(ImagingError::UnsupportedFormat(requested)) => {
            warn!(%requested, fallback = DEFAULT_MIME_TYPE, "no encoder for mime type");
            encode(backend, image, quality, DEFAULT_MIME_TYPE)
        }
        other => other,
    }
}

/// Full request: decode, correct orientation, resize, encode.
///
/// The mime type is checked before any pixel work so an unsupported request
/// fails fast.
pub fn transform(
    backend: &impl ImageBackend,
    bytes: &[u8],
    spec: &ResizeSpec,
    quality: Quality,
    mime_type: &str,
) -> Result<TransformResult> {
    if OutputFormat::from_mime(mime_type).is_none() {
        return Err(ImagingError::UnsupportedFormat(mime_type.to_string()));
    }
    let canvas = prepare(backend, bytes, spec)?;
    encode(backend, &canvas, quality, mime_type)
}

/// Like [`transform`], but encodes as [`DEFAULT_MIME_TYPE`] when the
/// requested mime type has no encoder.
pub fn transform_or_default(
    backend: &impl ImageBackend,
    bytes: &[u8],
    spec: &ResizeSpec,
    quality: Quality,
    mime_type: &str,
) -> Result<TransformResult> {
    let canvas = prepare(backend, bytes, spec)?;
    encode_or_default(backend, &canvas, quality, mime_type)
}

/// Scale an image to fit a `max_size × max_size` box.
pub fn resize_image(
    backend: &impl ImageBackend,
    bytes: &[u8],
    max_size: u32,
    quality: Quality,
    mime_type: &str,
) -> Result<TransformResult> {
    transform(
        backend,
        bytes,
        &ResizeSpec::square(ResizePolicy::Scale, max_size),
        quality,
        mime_type,
    )
}

/// Title, comment and orientation of encoded bytes, without decoding pixels.
///
/// Never fails: unreadable metadata comes back empty.
pub fn read_metadata(bytes: &[u8]) -> ImageMetadata {
    crate::metadata::read(bytes)
}

fn prepare(backend: &impl ImageBackend, bytes: &[u8], spec: &ResizeSpec) -> Result<SourceImage> {
    let source = decode(backend, bytes)?;
    let source = correct_orientation(backend, source);
    resize(backend, source, spec)
}
