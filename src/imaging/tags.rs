//! Tag table: EXIF-style metadata entries keyed by numeric tag id.
//!
//! Values are kept as raw bytes. Multi-byte numeric values (SHORT, LONG,
//! RATIONAL, …) are normalized to little-endian at parse time so readers never
//! need to know the byte order of the file they came from.

use std::collections::BTreeMap;

/// `ImageDescription` (IFD0, ASCII).
pub const TAG_IMAGE_DESCRIPTION: u16 = 270;
/// `Orientation` (IFD0, SHORT).
pub const TAG_ORIENTATION: u16 = 0x0112;
/// `XPTitle` (IFD0, UTF-16LE stored as BYTE).
pub const TAG_XP_TITLE: u16 = 40091;
/// `XPComment` (IFD0, UTF-16LE stored as BYTE).
pub const TAG_XP_COMMENT: u16 = 40092;

const XP_TAGS: std::ops::RangeInclusive<u16> = 0x9C9B..=0x9C9F;

/// Orientation value for an upright image.
pub const ORIENTATION_NORMAL: u8 = 1;

/// Text encoding of a tag payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Single-byte units, one-byte NUL terminator.
    Utf8,
    /// Little-endian double-byte units, two-byte NUL terminator.
    Utf16,
}

impl TextEncoding {
    /// Encoding hint for a tag as stored in the file.
    pub fn for_tag(id: u16) -> Self {
        if XP_TAGS.contains(&id) {
            Self::Utf16
        } else {
            Self::Utf8
        }
    }

    pub fn is_single_byte(self) -> bool {
        matches!(self, Self::Utf8)
    }

    fn terminator_len(self) -> usize {
        if self.is_single_byte() { 1 } else { 2 }
    }

    /// Decode a terminated payload.
    ///
    /// The trailing terminator (1 or 2 bytes) is dropped unconditionally.
    /// Returns `None` for malformed text; an empty payload decodes to `""`.
    pub fn decode(self, data: &[u8]) -> Option<String> {
        let Some(end) = data.len().checked_sub(self.terminator_len()) else {
            return Some(String::new());
        };
        let body = &data[..end];
        match self {
            Self::Utf8 => String::from_utf8(body.to_vec()).ok(),
            Self::Utf16 => {
                if body.len() % 2 != 0 {
                    return None;
                }
                let units: Vec<u16> = body
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect();
                String::from_utf16(&units).ok()
            }
        }
    }
}

/// One tag entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Raw payload; numeric components in little-endian order.
    pub value: Vec<u8>,
    pub encoding: TextEncoding,
}

/// Tags extracted from an image at decode time.
///
/// Read-only after extraction: updates return a new table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTable {
    tags: BTreeMap<u16, Tag>,
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn get(&self, id: u16) -> Option<&Tag> {
        self.tags.get(&id)
    }

    /// Record a tag. The first occurrence of an id wins; IFD0 is walked
    /// before sub-IFDs so primary-image values take precedence.
    pub(crate) fn insert(&mut self, id: u16, value: Vec<u8>) {
        self.tags.entry(id).or_insert_with(|| Tag {
            value,
            encoding: TextEncoding::for_tag(id),
        });
    }

    /// Builder-style insert, for tables assembled by hand.
    pub fn with_tag(mut self, id: u16, value: Vec<u8>) -> Self {
        self.tags.insert(
            id,
            Tag {
                value,
                encoding: TextEncoding::for_tag(id),
            },
        );
        self
    }

    /// Decode a tag as text with the given encoding.
    ///
    /// Missing tags and malformed payloads both read as `""`.
    pub fn text(&self, id: u16, encoding: TextEncoding) -> String {
        self.get(id)
            .and_then(|tag| encoding.decode(&tag.value))
            .unwrap_or_default()
    }

    /// First byte of the orientation tag, if present and non-empty.
    pub fn orientation(&self) -> Option<u8> {
        self.get(TAG_ORIENTATION)
            .and_then(|tag| tag.value.first().copied())
    }

    /// Copy of this table with the orientation reset to normal.
    ///
    /// Tables without an orientation tag come back unchanged.
    pub fn with_normal_orientation(&self) -> Self {
        let mut updated = self.clone();
        if let Some(tag) = updated.tags.get_mut(&TAG_ORIENTATION) {
            tag.value = vec![ORIENTATION_NORMAL, 0];
        }
        updated
    }
}
