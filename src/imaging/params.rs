//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what a request needs) and the [`backend`](super::backend)
//! (which does the actual pixel work). Keeping them backend-free lets the
//! operation tests run against a recording mock.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ResizePolicy`]: How a source is fitted into a target box (none/fit/scale/crop/fill).
//! - [`ResizeSpec`]: Policy + target box + optional background colour.
//! - [`Color`]: RGBA background colour, parsed from names or hex strings.
//! - [`Rotation`]: Clockwise quarter-turn rotation.
//! - [`OutputFormat`]: Encoder selection by mime type.
//! - [`ComposeParams`] / [`EncodeParams`]: What the backend receives.

use super::backend::Dimensions;
use super::calculations::Geometry;

/// Quality setting for lossy image encoding (1-100).
///
/// Callers may pass 0; it is raised to 1 since no encoder accepts a zero quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// How the source is fitted into the requested box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Keep the source size; the target box is ignored.
    #[default]
    None,
    /// Shrink/grow to fit inside the box, pad the rest of the box (with the
    /// background colour when one is given).
    Fit,
    /// Shrink/grow to fit inside the box; the canvas tracks the scaled image.
    Scale,
    /// Cover the whole box, overflow is cut off around the centre.
    Crop,
    /// Stretch to exactly the box, aspect ratio is not preserved.
    Fill,
}

impl ResizePolicy {
    /// Parse a policy name. Case-insensitive, surrounding whitespace ignored;
    /// unknown names fall back to [`ResizePolicy::None`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "fit" => Self::Fit,
            "scale" => Self::Scale,
            "crop" => Self::Crop,
            "fill" => Self::Fill,
            _ => Self::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fit => "fit",
            Self::Scale => "scale",
            Self::Crop => "crop",
            Self::Fill => "fill",
        }
    }
}

/// A straight (non-premultiplied) RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 128, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("darkgray", [169, 169, 169]),
    ("lightgray", [211, 211, 211]),
    ("gainsboro", [220, 220, 220]),
    ("whitesmoke", [245, 245, 245]),
    ("maroon", [128, 0, 0]),
    ("navy", [0, 0, 128]),
    ("olive", [128, 128, 0]),
    ("purple", [128, 0, 128]),
    ("teal", [0, 128, 128]),
    ("orange", [255, 165, 0]),
    ("beige", [245, 245, 220]),
    ("ivory", [255, 255, 240]),
    ("snow", [255, 250, 250]),
];

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a background colour.
    ///
    /// Accepts named colours (`"white"`, `"Black"`), `#rgb`, `#rrggbb` and
    /// `#rrggbbaa`. An empty string, `"empty"`, `"transparent"` or anything
    /// unrecognised means "no background" and yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if let Some(hex) = value.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let lower = value.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Self::rgb(*r, *g, *b))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    rgb[i] = v * 17;
                }
                Some(Self::rgb(rgb[0], rgb[1], rgb[2]))
            }
            6 => Some(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: byte(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A resize request: policy, target box and optional background.
///
/// The background only shows through where the redrawn image does not cover
/// the canvas, which in practice means [`ResizePolicy::Fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeSpec {
    pub policy: ResizePolicy,
    pub size: Dimensions,
    pub background: Option<Color>,
}

impl ResizeSpec {
    pub fn new(policy: ResizePolicy, width: u32, height: u32) -> Self {
        Self {
            policy,
            size: Dimensions { width, height },
            background: None,
        }
    }

    /// A square `max_size × max_size` box.
    pub fn square(policy: ResizePolicy, max_size: u32) -> Self {
        Self::new(policy, max_size, max_size)
    }

    /// Build a spec from request-style strings (`"crop"`, `"white"`).
    pub fn parse(policy: &str, width: u32, height: u32, background: &str) -> Self {
        Self::new(ResizePolicy::parse(policy), width, height)
            .with_background(Color::parse(background))
    }

    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }
}

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Map an EXIF orientation value to the rotation that makes the image upright.
    ///
    /// Only the pure rotations are honoured (6, 3, 8); mirrored orientations
    /// and `1` map to no rotation.
    pub fn from_orientation(value: u8) -> Self {
        match value {
            6 => Self::Cw90,
            3 => Self::Cw180,
            8 => Self::Cw270,
            _ => Self::None,
        }
    }
}

/// Output encoders, selected by mime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    WebP,
    Avif,
}

const FORMATS: &[(OutputFormat, &str, &[&str])] = &[
    (OutputFormat::Jpeg, "image/jpeg", &["jpg", "jpeg"]),
    (OutputFormat::Png, "image/png", &["png"]),
    (OutputFormat::Gif, "image/gif", &["gif"]),
    (OutputFormat::Bmp, "image/bmp", &["bmp"]),
    (OutputFormat::Tiff, "image/tiff", &["tif", "tiff"]),
    (OutputFormat::WebP, "image/webp", &["webp"]),
    (OutputFormat::Avif, "image/avif", &["avif"]),
];

impl OutputFormat {
    /// Find the encoder for a mime type (trimmed, case-insensitive).
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let wanted = mime_type.trim();
        FORMATS
            .iter()
            .find(|(_, mime, _)| mime.eq_ignore_ascii_case(wanted))
            .map(|(format, _, _)| *format)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        FORMATS
            .iter()
            .find(|(_, _, exts)| exts.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .map(|(format, _, _)| *format)
    }

    pub fn mime_type(self) -> &'static str {
        FORMATS
            .iter()
            .find(|(format, _, _)| *format == self)
            .map(|(_, mime, _)| *mime)
            .unwrap_or("application/octet-stream")
    }

    /// Whether the quality setting has any effect on this encoder.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpeg | Self::Avif)
    }
}

/// What the backend needs to draw a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeParams {
    pub geometry: Geometry,
    pub background: Option<Color>,
}

/// What the backend needs to serialize a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: OutputFormat,
    pub quality: Quality,
}
