//! CLI output formatting.
//!
//! Output leads with what a thing *is* (gallery name, image title) and puts
//! paths and URLs on indented context lines underneath, so a listing reads as
//! an inventory first and a file map second.
//!
//! # Output Format
//!
//! ## Galleries
//!
//! ```text
//! Galleries
//! 001 Sea
//!     Folder: /root/sea
//!     Icon: icon.jpg
//! 002 Mountains
//!     Folder: /root/mountains
//!     Icon: cover.jpg
//! ```
//!
//! ## Images
//!
//! ```text
//! Sea (3 images)
//!     001 (001.jpg)
//!         URL: /root/sea/001.jpg
//!     002 Harbour at dawn
//!         URL: /root/sea/002.jpg
//!         Comment: Low tide, no wind
//! ```
//!
//! ## Image info
//!
//! ```text
//! sea/002.jpg
//!     Size: 4000x3000
//!     Title: Harbour at dawn
//!     Orientation: 6
//! ```
//!
//! ## Transform
//!
//! ```text
//! photo.jpg → thumb.jpg
//!     Policy: fit 200x200
//!     Format: image/jpeg (quality 90)
//!     Bytes: 10342
//! ```
//!
//! Each listing has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! do no I/O.

use crate::gallery::ROOT_URL_PREFIX;
use crate::imaging::{Dimensions, ImageMetadata, ResizeSpec, TransformResult};
use crate::types::{Gallery, ImageEntry};
use std::path::Path;

/// Comments longer than this are cut in listings.
const COMMENT_PREVIEW_CHARS: usize = 60;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Header line with an image count.
///
/// ```text
/// Sea (3 images)
/// Photos (1 image)
/// ```
fn count_header(title: &str, count: usize) -> String {
    let noun = if count == 1 { "image" } else { "images" };
    format!("{title} ({count} {noun})")
}

/// Image line: titled images show the title, untitled show the filename in
/// parens.
///
/// ```text
/// 001 The Sunset
/// 002 (002.jpg)
/// ```
fn image_line(index: usize, title: &str, filename: &str) -> String {
    if title.is_empty() {
        format!("{} ({})", format_index(index), filename)
    } else {
        format!("{} {}", format_index(index), title)
    }
}

/// Cut text to `max` characters, appending `...` if cut.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn image_lines(entries: &[ImageEntry], depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "{}{}",
            indent(depth),
            image_line(i + 1, &entry.title, &entry.filename)
        ));
        lines.push(format!("{}URL: {}", indent(depth + 1), entry.url()));
        if !entry.comment.is_empty() {
            lines.push(format!(
                "{}Comment: {}",
                indent(depth + 1),
                truncate_desc(&entry.comment, COMMENT_PREVIEW_CHARS)
            ));
        }
    }
    lines
}

// ============================================================================
// Galleries
// ============================================================================

pub fn format_galleries(galleries: &[Gallery]) -> Vec<String> {
    let mut lines = vec!["Galleries".to_string()];
    if galleries.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, gallery) in galleries.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), gallery.name));
        lines.push(format!(
            "{}Folder: {ROOT_URL_PREFIX}/{}",
            indent(1),
            gallery.folder
        ));
        lines.push(format!("{}Icon: {}", indent(1), gallery.icon));
    }
    lines
}

pub fn print_galleries(galleries: &[Gallery]) {
    for line in format_galleries(galleries) {
        println!("{}", line);
    }
}

// ============================================================================
// Images
// ============================================================================

/// Images of one gallery (or of the photo folder) under a count header.
pub fn format_images(title: &str, entries: &[ImageEntry]) -> Vec<String> {
    let mut lines = vec![count_header(title, entries.len())];
    lines.extend(image_lines(entries, 1));
    lines
}

pub fn print_images(title: &str, entries: &[ImageEntry]) {
    for line in format_images(title, entries) {
        println!("{}", line);
    }
}

pub fn format_icon(gallery: &str, icon: &ImageEntry) -> Vec<String> {
    vec![
        format!("{gallery} icon"),
        format!("{}URL: {}", indent(1), icon.url()),
    ]
}

pub fn print_icon(gallery: &str, icon: &ImageEntry) {
    for line in format_icon(gallery, icon) {
        println!("{}", line);
    }
}

// ============================================================================
// Single image
// ============================================================================

/// Size and metadata of one image file. Empty fields are left out.
pub fn format_image_info(
    path: &Path,
    size: Option<Dimensions>,
    meta: &ImageMetadata,
) -> Vec<String> {
    let mut lines = vec![path.display().to_string()];
    match size {
        Some(dims) => lines.push(format!("{}Size: {}", indent(1), dims)),
        None => lines.push(format!("{}Size: (not decodable)", indent(1))),
    }
    if !meta.title.is_empty() {
        lines.push(format!("{}Title: {}", indent(1), meta.title));
    }
    if !meta.comment.is_empty() {
        lines.push(format!("{}Comment: {}", indent(1), meta.comment));
    }
    if let Some(orientation) = meta.orientation {
        lines.push(format!("{}Orientation: {}", indent(1), orientation));
    }
    lines
}

pub fn print_image_info(path: &Path, size: Option<Dimensions>, meta: &ImageMetadata) {
    for line in format_image_info(path, size, meta) {
        println!("{}", line);
    }
}

// ============================================================================
// Transform
// ============================================================================

pub fn format_transform(
    input: &Path,
    output: &Path,
    spec: &ResizeSpec,
    result: &TransformResult,
) -> Vec<String> {
    vec![
        format!("{} → {}", input.display(), output.display()),
        format!("{}Policy: {} {}", indent(1), spec.policy.name(), spec.size),
        format!(
            "{}Format: {} (quality {})",
            indent(1),
            result.mime_type,
            result.quality.value()
        ),
        format!("{}Bytes: {}", indent(1), result.bytes.len()),
    ]
}

pub fn print_transform(input: &Path, output: &Path, spec: &ResizeSpec, result: &TransformResult) {
    for line in format_transform(input, output, spec, result) {
        println!("{}", line);
    }
}
