//! Minimal EXIF tag reader for JPEG, PNG and TIFF files.
//!
//! Collects every entry of the primary IFD (IFD0) and of the Exif sub-IFD it
//! points to into a [`TagTable`]. IFD1 describes the embedded thumbnail and is
//! never read. That covers the fields the gallery cares about:
//! - ImageDescription (270): title
//! - XPTitle (40091) / XPComment (40092): Windows title and comment, UTF-16
//! - Orientation (0x112): camera rotation
//!
//! Containers:
//! - JPEG: APP1 segment starting with `Exif\0\0`, followed by a TIFF block.
//! - PNG: `eXIf` chunk holding a bare TIFF block.
//! - TIFF: the file itself.
//!
//! Zero external dependencies. Never fails: unreadable or truncated data
//! yields whatever was collected before the damage (often an empty table).

use super::tags::TagTable;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const PNG_EXIF_CHUNK: &[u8] = b"eXIf";
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;

/// Read tags from an encoded image, dispatching on its magic bytes.
pub fn read_tags(data: &[u8]) -> TagTable {
    if data.starts_with(&[0xFF, 0xD8]) {
        find_jpeg_exif(data).map(parse_tiff).unwrap_or_default()
    } else if data.starts_with(PNG_SIGNATURE) {
        find_png_exif(data).map(parse_tiff).unwrap_or_default()
    } else if data.starts_with(b"II") || data.starts_with(b"MM") {
        parse_tiff(data)
    } else {
        TagTable::default()
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Find the TIFF block inside a JPEG's `Exif` APP1 segment.
fn find_jpeg_exif(data: &[u8]) -> Option<&[u8]> {
    // Skip SOI
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        // Fill bytes before a marker
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS (0xDA) means entropy-coded data starts; EOI ends the file
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Markers without a length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            break;
        }
        let seg_start = pos + 4;
        let seg_end = (pos + 2 + seg_len).min(data.len());

        if marker == 0xE1 {
            if let Some(tiff) = data[seg_start..seg_end].strip_prefix(EXIF_HEADER) {
                return Some(tiff);
            }
        }
        pos += 2 + seg_len;
    }
    None
}

/// Find the payload of a PNG `eXIf` chunk.
fn find_png_exif(data: &[u8]) -> Option<&[u8]> {
    let mut pos = PNG_SIGNATURE.len();
    // Each chunk: length (4, BE) + type (4) + data + CRC (4)
    while pos + 8 <= data.len() {
        let len = u32::from_be_bytes(data[pos..pos + 4].try_into().ok()?) as usize;
        let kind = &data[pos + 4..pos + 8];
        let body_start = pos + 8;
        let body_end = body_start.checked_add(len)?;
        if body_end > data.len() {
            return None;
        }
        if kind == PNG_EXIF_CHUNK {
            return Some(&data[body_start..body_end]);
        }
        if kind == b"IDAT" || kind == b"IEND" {
            // eXIf must precede image data
            return None;
        }
        pos = body_end + 4;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF structure
// ---------------------------------------------------------------------------

/// Bounds-checked reader over a TIFF block in either byte order.
struct TiffReader<'a> {
    data: &'a [u8],
    big_endian: bool,
}

impl<'a> TiffReader<'a> {
    fn new(data: &'a [u8]) -> Option<Self> {
        let big_endian = match data.get(0..2)? {
            b"MM" => true,
            b"II" => false,
            _ => return None,
        };
        let reader = Self { data, big_endian };
        // Verify TIFF magic (42)
        (reader.u16_at(2)? == 42).then_some(reader)
    }

    fn bytes(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        self.data.get(offset..offset.checked_add(len)?)
    }

    fn u16_at(&self, offset: usize) -> Option<u16> {
        let b: [u8; 2] = self.bytes(offset, 2)?.try_into().ok()?;
        Some(if self.big_endian {
            u16::from_be_bytes(b)
        } else {
            u16::from_le_bytes(b)
        })
    }

    fn u32_at(&self, offset: usize) -> Option<u32> {
        let b: [u8; 4] = self.bytes(offset, 4)?.try_into().ok()?;
        Some(if self.big_endian {
            u32::from_be_bytes(b)
        } else {
            u32::from_le_bytes(b)
        })
    }

    /// Copy `raw` with every `unit`-byte component converted to little-endian.
    fn to_little_endian(&self, raw: &[u8], unit: usize) -> Vec<u8> {
        if !self.big_endian || unit == 1 {
            return raw.to_vec();
        }
        raw.chunks(unit)
            .flat_map(|chunk| chunk.iter().rev().copied())
            .collect()
    }
}

/// TIFF field types: (bytes per value, bytes per numeric component).
///
/// RATIONAL is one value made of two LONG components.
fn type_layout(typ: u16) -> (usize, usize) {
    match typ {
        1 | 2 | 6 | 7 => (1, 1), // BYTE, ASCII, SBYTE, UNDEFINED
        3 | 8 => (2, 2),         // SHORT, SSHORT
        4 | 9 | 11 => (4, 4),    // LONG, SLONG, FLOAT
        5 | 10 => (8, 4),        // RATIONAL, SRATIONAL
        12 => (8, 8),            // DOUBLE
        _ => (1, 1),
    }
}

/// Parse a TIFF block into a tag table: IFD0, then the Exif sub-IFD.
fn parse_tiff(data: &[u8]) -> TagTable {
    let mut table = TagTable::default();
    let Some(reader) = TiffReader::new(data) else {
        return table;
    };
    let Some(ifd0) = reader.u32_at(4) else {
        return table;
    };

    let mut exif_ifd = None;
    read_ifd(&reader, ifd0 as usize, &mut table, &mut exif_ifd);

    if let Some(offset) = exif_ifd {
        let mut nested = None;
        read_ifd(&reader, offset, &mut table, &mut nested);
    }

    table
}

/// Read one IFD into `table`, stopping at the first truncated entry.
///
/// The next-IFD link at the end of the directory is ignored.
fn read_ifd(
    reader: &TiffReader<'_>,
    ifd_offset: usize,
    table: &mut TagTable,
    exif_ifd: &mut Option<usize>,
) -> Option<()> {
    let entry_count = reader.u16_at(ifd_offset)? as usize;
    let entries_start = ifd_offset + 2;

    for i in 0..entry_count {
        let entry_offset = entries_start + i * 12;
        let tag = reader.u16_at(entry_offset)?;
        let typ = reader.u16_at(entry_offset + 2)?;
        let count = reader.u32_at(entry_offset + 4)? as usize;
        let (value_size, unit) = type_layout(typ);
        let Some(byte_len) = count.checked_mul(value_size) else {
            continue;
        };

        // Values of up to four bytes live in the entry itself
        let raw = if byte_len <= 4 {
            reader.bytes(entry_offset + 8, byte_len)
        } else {
            reader
                .u32_at(entry_offset + 8)
                .and_then(|offset| reader.bytes(offset as usize, byte_len))
        };
        let Some(raw) = raw else {
            continue;
        };

        if tag == TAG_EXIF_IFD_POINTER {
            if exif_ifd.is_none() {
                *exif_ifd = reader.u32_at(entry_offset + 8).map(|o| o as usize);
            }
            continue;
        }

        table.insert(tag, reader.to_little_endian(raw, unit));
    }
    Some(())
}
