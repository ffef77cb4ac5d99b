//! Shared test utilities for the photo-gallery test suite.
//!
//! Provides synthetic images (JPEG/PNG, optionally carrying a hand-built EXIF
//! block) and a temporary gallery root with a `data.json` manifest.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let jpeg = jpeg_with_exif(64, 32, &[
//!     TiffEntry::ascii(TAG_IMAGE_DESCRIPTION, "Sunset"),
//!     TiffEntry::short(TAG_ORIENTATION, 6),
//! ]);
//!
//! let root = setup_gallery_root();
//! let catalog = GalleryCatalog::new(root.path(), root.path());
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;

// =========================================================================
// Pixel fixtures
// =========================================================================

/// Opaque image split into four coloured quadrants:
/// red (top-left), green (top-right), blue (bottom-left), white (bottom-right).
pub fn quadrant_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        match (x < width / 2, y < height / 2) {
            (true, true) => Rgba([255, 0, 0, 255]),
            (false, true) => Rgba([0, 255, 0, 255]),
            (true, false) => Rgba([0, 0, 255, 255]),
            (false, false) => Rgba([255, 255, 255, 255]),
        }
    })
}

/// Baseline JPEG of a smooth gradient, no metadata.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
        .unwrap();
    buf
}

/// PNG of [`quadrant_image`], no metadata.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(quadrant_image(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

// =========================================================================
// EXIF fixtures
// =========================================================================

#[derive(Debug, Clone)]
enum TiffValue {
    Ascii(Vec<u8>),
    Short(u16),
    Bytes(Vec<u8>),
}

/// One IFD0 entry for [`build_tiff`].
#[derive(Debug, Clone)]
pub struct TiffEntry {
    tag: u16,
    value: TiffValue,
}

impl TiffEntry {
    /// ASCII entry; the terminating NUL is added.
    pub fn ascii(tag: u16, text: &str) -> Self {
        Self {
            tag,
            value: TiffValue::Ascii(asciiz(text)),
        }
    }

    pub fn short(tag: u16, value: u16) -> Self {
        Self {
            tag,
            value: TiffValue::Short(value),
        }
    }

    /// BYTE entry with a raw payload, as Windows writes the XP fields.
    pub fn bytes(tag: u16, payload: Vec<u8>) -> Self {
        Self {
            tag,
            value: TiffValue::Bytes(payload),
        }
    }
}

/// NUL-terminated UTF-8.
pub fn asciiz(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    bytes
}

/// NUL-terminated UTF-16LE.
pub fn utf16z(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

/// A TIFF block with a single IFD holding `entries`.
///
/// Payloads up to four bytes are stored inline in the entry; longer ones go
/// into a data area after the IFD.
pub fn build_tiff(big_endian: bool, entries: &[TiffEntry]) -> Vec<u8> {
    let u16b = |v: u16| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let u32b = |v: u32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };

    let mut out = Vec::new();
    out.extend_from_slice(if big_endian { b"MM" } else { b"II" });
    out.extend_from_slice(&u16b(42));
    out.extend_from_slice(&u32b(8));

    let ifd_len = 2 + entries.len() * 12 + 4;
    let mut data_area: Vec<u8> = Vec::new();
    out.extend_from_slice(&u16b(entries.len() as u16));

    for entry in entries {
        let (typ, count, payload) = match &entry.value {
            TiffValue::Ascii(bytes) => (2u16, bytes.len() as u32, bytes.clone()),
            TiffValue::Short(v) => (3u16, 1, u16b(*v).to_vec()),
            TiffValue::Bytes(bytes) => (1u16, bytes.len() as u32, bytes.clone()),
        };
        out.extend_from_slice(&u16b(entry.tag));
        out.extend_from_slice(&u16b(typ));
        out.extend_from_slice(&u32b(count));
        if payload.len() <= 4 {
            let mut slot = [0u8; 4];
            slot[..payload.len()].copy_from_slice(&payload);
            out.extend_from_slice(&slot);
        } else {
            let offset = 8 + ifd_len + data_area.len();
            out.extend_from_slice(&u32b(offset as u32));
            data_area.extend_from_slice(&payload);
            if data_area.len() % 2 == 1 {
                data_area.push(0);
            }
        }
    }
    out.extend_from_slice(&u32b(0));
    out.extend_from_slice(&data_area);
    out
}

/// [`jpeg_bytes`] with an APP1 `Exif` segment right after SOI.
pub fn jpeg_with_exif(width: u32, height: u32, entries: &[TiffEntry]) -> Vec<u8> {
    let jpeg = jpeg_bytes(width, height);
    let tiff = build_tiff(false, entries);

    let mut segment = vec![0xFF, 0xE1];
    segment.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// [`png_bytes`] with an `eXIf` chunk right after IHDR.
pub fn png_with_exif(width: u32, height: u32, entries: &[TiffEntry]) -> Vec<u8> {
    // 8-byte signature + IHDR (4 length + 4 type + 13 data + 4 crc)
    const AFTER_IHDR: usize = 33;
    let png = png_bytes(width, height);
    let tiff = build_tiff(false, entries);

    let mut body = b"eXIf".to_vec();
    body.extend_from_slice(&tiff);
    let mut chunk = (tiff.len() as u32).to_be_bytes().to_vec();
    chunk.extend_from_slice(&body);
    chunk.extend_from_slice(&crc32(&body).to_be_bytes());

    let mut out = png[..AFTER_IHDR].to_vec();
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[AFTER_IHDR..]);
    out
}

/// CRC-32 (IEEE), as PNG chunks use.
fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

// =========================================================================
// Gallery root
// =========================================================================

/// A temp data root with three galleries:
///
/// ```text
/// data.json   Sea, Mountains, Empty
/// sea/        icon.jpg 001.jpg 002.PNG notes.txt
/// mountains/  001.jpg          (icon "cover.jpg" missing)
///                              (Empty: folder missing)
/// ```
pub fn setup_gallery_root() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(
        root.join("data.json"),
        r#"[
  {"Name": "Sea", "Folder": "sea", "Icon": "icon.jpg"},
  {"Name": "Mountains", "Folder": "mountains", "Icon": "cover.jpg"},
  {"Name": "Empty", "Folder": "empty", "Icon": "icon.jpg"}
]"#,
    )
    .unwrap();

    fs::create_dir(root.join("sea")).unwrap();
    fs::write(root.join("sea/icon.jpg"), jpeg_bytes(8, 8)).unwrap();
    fs::write(root.join("sea/001.jpg"), jpeg_bytes(16, 8)).unwrap();
    fs::write(root.join("sea/002.PNG"), png_bytes(8, 16)).unwrap();
    fs::write(root.join("sea/notes.txt"), "not an image").unwrap();

    fs::create_dir(root.join("mountains")).unwrap();
    fs::write(root.join("mountains/001.jpg"), jpeg_bytes(8, 8)).unwrap();
    tmp
}

mod tests {
    use super::*;

    #[test]
    fn crc32_matches_reference_value() {
        assert_eq!(crc32(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn png_with_exif_still_decodes() {
        let png = png_with_exif(4, 4, &[TiffEntry::short(0x0112, 1)]);
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
    }
}
