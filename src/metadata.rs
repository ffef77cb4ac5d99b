//! Image metadata extraction: title and comment.
//!
//! Both fields come from EXIF-style tags read at decode time (see
//! [`imaging::tags`](crate::imaging::tags)):
//!
//! - **Title**: ImageDescription (270) as UTF-8. This is what most cameras and
//!   Lightroom write. When it is missing or empty, Windows' XPTitle (40091,
//!   UTF-16) is used instead; that is what Explorer's "Title" field edits.
//! - **Comment**: XPComment (40092, UTF-16), Explorer's "Comments" field.
//!
//! ## Failure policy
//!
//! Metadata is decoration. Nothing in this module returns an error: missing
//! tags, malformed text and unreadable files all resolve to an empty string so
//! a listing never fails because one photo carries odd bytes.

use crate::imaging::ImageMetadata;
use crate::imaging::exif_parser;
use crate::imaging::tags::{
    TAG_IMAGE_DESCRIPTION, TAG_XP_COMMENT, TAG_XP_TITLE, TagTable, TextEncoding,
};
use std::path::Path;
use tracing::debug;

/// Resolve a metadata field from multiple sources.
///
/// Takes values in priority order and returns the first non-empty one, or
/// `""` when all are empty.
///
/// ```text
/// title: resolve([ImageDescription, XPTitle])
/// ```
pub fn resolve<I>(sources: I) -> String
where
    I: IntoIterator<Item = String>,
{
    sources
        .into_iter()
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Title of an image: ImageDescription, else XPTitle, else `""`.
pub fn title(tags: &TagTable) -> String {
    resolve([
        tags.text(TAG_IMAGE_DESCRIPTION, TextEncoding::Utf8),
        tags.text(TAG_XP_TITLE, TextEncoding::Utf16),
    ])
}

/// Comment of an image: XPComment, else `""`.
pub fn comment(tags: &TagTable) -> String {
    tags.text(TAG_XP_COMMENT, TextEncoding::Utf16)
}

/// Collect title, comment and orientation from a tag table.
pub fn from_tags(tags: &TagTable) -> ImageMetadata {
    ImageMetadata {
        title: title(tags),
        comment: comment(tags),
        orientation: tags.orientation(),
    }
}

/// Read metadata straight from encoded bytes, without decoding pixels.
pub fn read(bytes: &[u8]) -> ImageMetadata {
    from_tags(&exif_parser::read_tags(bytes))
}

/// Read metadata from an image file. Unreadable files yield empty metadata.
pub fn read_file(path: &Path) -> ImageMetadata {
    match std::fs::read(path) {
        Ok(bytes) => read(&bytes),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "metadata unavailable");
            ImageMetadata::default()
        }
    }
}
