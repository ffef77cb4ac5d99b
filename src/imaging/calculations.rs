//! Pure geometry for resize requests.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use super::params::{ResizePolicy, ResizeSpec};

/// Where and how large the source is drawn, and how large the canvas is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Size the source is resampled to before it is placed on the canvas.
    pub redraw: Dimensions,
    /// Size of the output image.
    pub canvas: Dimensions,
}

impl Geometry {
    /// Top-left position of the redrawn image, centred on the canvas.
    ///
    /// Negative when the redraw is larger than the canvas (crop); the
    /// overflowing pixels simply fall outside the canvas.
    pub fn offset(&self) -> (i64, i64) {
        let x = (self.canvas.width as i64 - self.redraw.width as i64) / 2;
        let y = (self.canvas.height as i64 - self.redraw.height as i64) / 2;
        (x, y)
    }

    /// True when drawing is a plain copy: no resampling, no padding.
    pub fn is_identity(&self, source: Dimensions) -> bool {
        self.redraw == source && self.canvas == source
    }
}

/// Compute redraw and canvas sizes for a source under a resize spec.
///
/// The source must be non-empty in both axes; decoding rejects empty images
/// before they get here.
///
/// | Policy | Scale factor | Redraw | Canvas |
/// |---|---|---|---|
/// | None | 1.0 | source | redraw |
/// | Fit | min(W/w, H/h) | source × factor | target |
/// | Scale | min(W/w, H/h) | source × factor | redraw |
/// | Crop | max(W/w, H/h) | source × factor | target |
/// | Fill | n/a | target | target |
///
/// # Examples
/// ```
/// # use photo_gallery::imaging::{Dimensions, ResizePolicy, ResizeSpec, resolve};
/// let source = Dimensions { width: 1000, height: 500 };
/// let geometry = resolve(source, &ResizeSpec::new(ResizePolicy::Fit, 200, 200));
/// assert_eq!(geometry.redraw, Dimensions { width: 200, height: 100 });
/// assert_eq!(geometry.canvas, Dimensions { width: 200, height: 200 });
/// assert_eq!(geometry.offset(), (0, 50));
/// ```
pub fn resolve(source: Dimensions, spec: &ResizeSpec) -> Geometry {
    let target = spec.size;
    let percent_width = target.width as f64 / source.width as f64;
    let percent_height = target.height as f64 / source.height as f64;

    let redraw = match spec.policy {
        ResizePolicy::None => source,
        ResizePolicy::Fit | ResizePolicy::Scale => {
            scaled(source, percent_width.min(percent_height))
        }
        ResizePolicy::Crop => scaled(source, percent_width.max(percent_height)),
        // Fill stretches, ignoring the aspect ratio.
        ResizePolicy::Fill => target,
    };

    let canvas = match spec.policy {
        ResizePolicy::None | ResizePolicy::Scale => redraw,
        ResizePolicy::Fit | ResizePolicy::Crop | ResizePolicy::Fill => target,
    };

    Geometry { redraw, canvas }
}

fn scaled(source: Dimensions, percent: f64) -> Dimensions {
    Dimensions {
        width: scale(source.width, percent),
        height: scale(source.height, percent),
    }
}

fn scale(length: u32, percent: f64) -> u32 {
    (length as f64 * percent).round() as u32
}
