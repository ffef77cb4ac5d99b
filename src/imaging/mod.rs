//! Image transform engine, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, GIF, BMP, TIFF, WebP) |
//! | **Tags** | custom parser (JPEG APP1 + PNG `eXIf` + TIFF IFD) |
//! | **Geometry** | [`resolve`]: none / fit / scale / crop / fill |
//! | **Compose** | CatmullRom resample + centred overlay on an RGBA canvas |
//! | **Encode** | by mime type; JPEG/AVIF honour quality |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Tags**: Tag table and text decoding; **exif_parser** fills it
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod exif_parser;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod tags;

pub use backend::{Dimensions, ImageBackend, ImageMetadata, ImagingError, SourceImage};
pub use calculations::{Geometry, resolve};
pub use operations::{
    DEFAULT_MIME_TYPE, MAX_PIXELS, TransformResult, correct_orientation, decode, encode,
    encode_or_default, pad, pad_to, read_metadata, resize, resize_image, rotate, transform,
    transform_or_default,
};
pub use params::{
    Color, ComposeParams, EncodeParams, OutputFormat, Quality, ResizePolicy, ResizeSpec, Rotation,
};
pub use rust_backend::RustBackend;
pub use tags::{TagTable, TextEncoding};
