//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the UI-facing boundary (which clamps slider values) and
//! the [`pipeline`](super::pipeline) (which trusts them).
//!
//! ## Types
//!
//! - [`ProcessingParams`] — Target size, fit mode and every adjustment for one run.
//! - [`ResizeMode`] — Contain (letterbox on white) or Cover (centre crop).
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ExportFormat`] — PNG or JPEG.
//!
//! ## Preconditions
//!
//! The pipeline does not re-validate adjustment ranges. Whoever builds a
//! `ProcessingParams` from user input runs [`ProcessingParams::clamped`]
//! first. Only zero target dimensions are checked inside the pipeline.

use super::calculations::{linked_height, linked_width};
use serde::{Deserialize, Serialize};

/// Range of brightness, contrast and saturation.
pub const TONE_RANGE: std::ops::RangeInclusive<i32> = -100..=100;
/// Upper bound of sharpen and smoothing.
pub const FILTER_MAX: u32 = 100;

/// How the source is fitted into the target canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    /// Scale to fit inside, pad the rest with opaque white.
    #[default]
    Contain,
    /// Scale to fill, centre-crop the overflow.
    Cover,
}

/// Everything one pipeline run needs besides the source pixels.
///
/// Serializes in camelCase so front-end parameter objects map directly:
///
/// ```
/// # use photo_resizer::imaging::{ProcessingParams, ResizeMode};
/// let p = ProcessingParams::from_json(
///     r#"{"width":4,"height":4,"resizeMode":"contain","brightness":50}"#,
/// ).unwrap();
/// assert_eq!(p.resize_mode, ResizeMode::Contain);
/// assert_eq!(p.brightness, 50);
/// assert!(p.maintain_aspect);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ProcessingParams {
    pub width: u32,
    pub height: u32,
    /// Link width and height edits to the source aspect ratio.
    pub maintain_aspect: bool,
    pub resize_mode: ResizeMode,
    /// -100..=100
    pub brightness: i32,
    /// -100..=100
    pub contrast: i32,
    /// -100..=100
    pub saturation: i32,
    /// 0..=100
    pub sharpen: u32,
    /// 0..=100
    pub smoothing: u32,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            maintain_aspect: true,
            resize_mode: ResizeMode::Contain,
            brightness: 0,
            contrast: 0,
            saturation: 0,
            sharpen: 0,
            smoothing: 0,
        }
    }
}

impl ProcessingParams {
    /// Fresh parameters for a newly loaded source: its own size, no adjustments.
    pub fn for_source(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Bring every adjustment into its documented range.
    pub fn clamped(self) -> Self {
        Self {
            brightness: self.brightness.clamp(*TONE_RANGE.start(), *TONE_RANGE.end()),
            contrast: self.contrast.clamp(*TONE_RANGE.start(), *TONE_RANGE.end()),
            saturation: self.saturation.clamp(*TONE_RANGE.start(), *TONE_RANGE.end()),
            sharpen: self.sharpen.min(FILTER_MAX),
            smoothing: self.smoothing.min(FILTER_MAX),
            ..self
        }
    }

    /// Set the target width, relinking the height when the aspect lock is on.
    ///
    /// A width of 0 never relinks, so a half-typed field does not zero the
    /// other dimension.
    pub fn set_width(&mut self, width: u32, source: (u32, u32)) {
        self.width = width;
        if self.maintain_aspect && width > 0 && source.1 > 0 {
            self.height = linked_height(source, width);
        }
    }

    /// Set the target height, relinking the width when the aspect lock is on.
    pub fn set_height(&mut self, height: u32, source: (u32, u32)) {
        self.height = height;
        if self.maintain_aspect && height > 0 && source.1 > 0 {
            self.width = linked_width(source, height);
        }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct Quality(u32);

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

impl From<u32> for Quality {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

/// Encoded output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless, keeps alpha.
    Png,
    /// Lossy at a caller-chosen [`Quality`].
    #[default]
    Jpeg,
}

impl ExportFormat {
    /// File extension used for downloads.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }
}
