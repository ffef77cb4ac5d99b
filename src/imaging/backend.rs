//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the four pixel operations every backend
//! must support: decode, rotate, compose and encode. Everything that is pure
//! decision-making (geometry, orientation mapping, mime lookup) lives in
//! [`operations`](super::operations) and runs the same against any backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::params::{ComposeParams, EncodeParams, Rotation};
use super::tags::TagTable;
use image::DynamicImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("Image too large: {0}")]
    TooLarge(Dimensions),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel count; cannot overflow for any `u32` pair.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Embedded text metadata of an image.
///
/// Field mapping:
/// - `title`: ImageDescription (270), falling back to XPTitle (40091)
/// - `comment`: XPComment (40092)
/// - `orientation`: raw Orientation (0x112) value, if present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub title: String,
    pub comment: String,
    pub orientation: Option<u8>,
}

/// A decoded image and the tags read from the same bytes.
///
/// Owned by the request that decoded it; operations consume it and hand back
/// a new one, so the pixel buffer is released as soon as it is replaced.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: DynamicImage,
    pub tags: TagTable,
}

impl SourceImage {
    pub fn new(pixels: DynamicImage, tags: TagTable) -> Self {
        Self { pixels, tags }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    pub fn metadata(&self) -> ImageMetadata {
        crate::metadata::from_tags(&self.tags)
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all four operations so the rest of the
/// codebase is backend-agnostic.
pub trait ImageBackend: Sync {
    /// Decode raster bytes and read their tag table.
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, ImagingError>;

    /// Rotate clockwise. Tags are carried over untouched.
    fn rotate(&self, source: SourceImage, rotation: Rotation) -> SourceImage;

    /// Draw `source` onto a fresh canvas as described by `params`.
    fn compose(&self, source: &SourceImage, params: &ComposeParams)
    -> Result<SourceImage, ImagingError>;

    /// Serialize an image.
    fn encode(&self, image: &SourceImage, params: &EncodeParams) -> Result<Vec<u8>, ImagingError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock backend that records operations and returns blank images of the
    /// right size instead of doing pixel work.
    /// Uses Mutex (not RefCell) so it is Sync like the real backend.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_results: Mutex<Vec<SourceImage>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(usize),
        Rotate(Rotation),
        Compose {
            redraw: Dimensions,
            canvas: Dimensions,
            background: Option<[u8; 4]>,
        },
        Encode {
            mime_type: &'static str,
            quality: u32,
            width: u32,
            height: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Backend whose next decode yields a blank `width × height` image
        /// carrying `tags`.
        pub fn with_source(width: u32, height: u32, tags: TagTable) -> Self {
            let source = SourceImage::new(DynamicImage::new_rgba8(width, height), tags);
            Self {
                decode_results: Mutex::new(vec![source]),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, bytes: &[u8]) -> Result<SourceImage, ImagingError> {
            self.record(RecordedOp::Decode(bytes.len()));
            self.decode_results
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ImagingError::InvalidImage("No mock source".to_string()))
        }

        fn rotate(&self, source: SourceImage, rotation: Rotation) -> SourceImage {
            self.record(RecordedOp::Rotate(rotation));
            let Dimensions { width, height } = source.dimensions();
            let (width, height) = match rotation {
                Rotation::Cw90 | Rotation::Cw270 => (height, width),
                Rotation::None | Rotation::Cw180 => (width, height),
            };
            SourceImage::new(DynamicImage::new_rgba8(width, height), source.tags)
        }

        fn compose(
            &self,
            source: &SourceImage,
            params: &ComposeParams,
        ) -> Result<SourceImage, ImagingError> {
            let canvas = params.geometry.canvas;
            self.record(RecordedOp::Compose {
                redraw: params.geometry.redraw,
                canvas,
                background: params.background.map(|c| c.to_rgba()),
            });
            Ok(SourceImage::new(
                DynamicImage::new_rgba8(canvas.width, canvas.height),
                source.tags.clone(),
            ))
        }

        fn encode(
            &self,
            image: &SourceImage,
            params: &EncodeParams,
        ) -> Result<Vec<u8>, ImagingError> {
            let Dimensions { width, height } = image.dimensions();
            self.record(RecordedOp::Encode {
                mime_type: params.format.mime_type(),
                quality: params.quality.value(),
                width,
                height,
            });
            Ok(vec![0xAB; 4])
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_source(800, 600, TagTable::new());

        let source = backend.decode(&[1, 2, 3]).unwrap();
        assert_eq!(source.dimensions(), Dimensions::new(800, 600));

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode(3)]);
    }

    #[test]
    fn mock_decode_without_source_is_invalid_image() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.decode(&[]),
            Err(ImagingError::InvalidImage(_))
        ));
    }

    #[test]
    fn mock_rotate_swaps_dimensions_for_quarter_turns() {
        let backend = MockBackend::new();
        let source = SourceImage::new(DynamicImage::new_rgba8(30, 10), TagTable::new());
        let rotated = backend.rotate(source, Rotation::Cw90);
        assert_eq!(rotated.dimensions(), Dimensions::new(10, 30));
    }

    #[test]
    fn dimensions_display_and_empty() {
        assert_eq!(Dimensions::new(200, 100).to_string(), "200x100");
        assert!(Dimensions::new(0, 100).is_empty());
        assert!(!Dimensions::new(1, 1).is_empty());
    }
}
