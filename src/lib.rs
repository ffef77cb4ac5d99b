//! # Photo Gallery
//!
//! Gallery lookup and an image-transform core for a photo-gallery site.
//! Galleries are defined by a JSON manifest next to one folder per gallery;
//! images are resized, padded, cropped and re-encoded on request.
//!
//! # Architecture: One Request, Five Steps
//!
//! Every transform is a self-contained, synchronous pipeline:
//!
//! ```text
//! bytes ─decode─▶ pixels + tags ─orient─▶ upright ─resolve─▶ geometry ─compose─▶ canvas ─encode─▶ bytes
//! ```
//!
//! - **Decode** reads pixels and a small tag table (title, comment,
//!   orientation) from JPEG APP1, PNG `eXIf` or bare TIFF.
//! - **Orient** rotates per the orientation tag and rewrites it to normal, so
//!   a second pass changes nothing.
//! - **Resolve** is pure arithmetic: policy + source size + target box give
//!   the redraw size and the canvas size.
//! - **Compose** resamples onto a canvas filled with an optional background,
//!   centred.
//! - **Encode** picks an encoder by mime type; lossy formats honour quality.
//!
//! No state is shared between transforms. The only shared state in the crate
//! is the gallery manifest, read once per [`gallery::GalleryCatalog`] and then
//! frozen.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Transform core: geometry, tags, backend trait, `image`-crate backend, pipelines |
//! | [`metadata`] | Title and comment resolution from tags; never fails |
//! | [`gallery`] | Manifest-backed gallery lookup, image listing, static photo folder |
//! | [`types`] | Serializable `Gallery` and `ImageEntry` records |
//! | [`config`] | `config.toml` loading over stock defaults, `DATA_ROOT` override |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Backend Trait
//!
//! Pixel work goes through [`imaging::ImageBackend`]. The pipelines in
//! [`imaging::operations`] only compute parameters and call the backend, so
//! their ordering and arithmetic are tested against a recording mock without
//! encoding a single image.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, resampling and encoding use the `image` crate (CatmullRom
//! resampling) with no system libraries. Metadata tags are read by a small
//! built-in parser that only keeps the handful of tags the gallery shows.
//!
//! ## Metadata Never Fails
//!
//! Titles and comments are decoration. Missing tags, malformed text and
//! unreadable files all become an empty string instead of an error.

pub mod config;
pub mod gallery;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
