//! ColorAdjuster: brightness, contrast and saturation.
//!
//! Each pixel is carried through the three steps as `f64` in a fixed order
//! and only clamped (and rounded) once, when written back. A step whose
//! parameter is zero is skipped outright.
//!
//! | Step | Formula |
//! |---|---|
//! | Brightness | `c + brightness * 2.55` |
//! | Contrast | `f * (c - 128) + 128`, `f = 259 (contrast + 255) / (255 (259 - contrast))` |
//! | Saturation | `gray + (1 + saturation/100) * (c - gray)`, gray = `0.2989 r + 0.587 g + 0.114 b` |
//!
//! Saturation takes its gray from the post-contrast values of the same
//! pixel, not from the original ones. Alpha is never touched.

use crate::buffer::{CHANNELS, PixelBuffer};
use rayon::prelude::*;

/// Luma weights used for the saturation gray point.
const LUMA_R: f64 = 0.2989;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// Resolved per-run factors; `None` means the step is skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneAdjustment {
    brightness: Option<f64>,
    contrast: Option<f64>,
    saturation: Option<f64>,
}

impl ToneAdjustment {
    /// Precompute factors from slider values in `-100..=100`.
    ///
    /// `contrast` must never be 259; the slider range guarantees it.
    pub fn new(brightness: i32, contrast: i32, saturation: i32) -> Self {
        let nonzero = |v: i32| (v != 0).then_some(f64::from(v));
        Self {
            brightness: nonzero(brightness).map(|b| b * 2.55),
            contrast: nonzero(contrast)
                .map(|c| (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))),
            saturation: nonzero(saturation).map(|s| 1.0 + s / 100.0),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.brightness.is_none() && self.contrast.is_none() && self.saturation.is_none()
    }

    /// Run all enabled steps on one pixel's color channels, unclamped.
    pub fn apply(&self, rgb: [f64; 3]) -> [f64; 3] {
        let [mut r, mut g, mut b] = rgb;

        if let Some(offset) = self.brightness {
            r += offset;
            g += offset;
            b += offset;
        }

        if let Some(factor) = self.contrast {
            r = factor * (r - 128.0) + 128.0;
            g = factor * (g - 128.0) + 128.0;
            b = factor * (b - 128.0) + 128.0;
        }

        if let Some(factor) = self.saturation {
            let gray = LUMA_R * r + LUMA_G * g + LUMA_B * b;
            r = gray + factor * (r - gray);
            g = gray + factor * (g - gray);
            b = gray + factor * (b - gray);
        }

        [r, g, b]
    }
}

/// Apply brightness, contrast and saturation to `buffer` in place.
pub fn adjust_colors(
    mut buffer: PixelBuffer,
    brightness: i32,
    contrast: i32,
    saturation: i32,
) -> PixelBuffer {
    let tone = ToneAdjustment::new(brightness, contrast, saturation);
    if tone.is_identity() {
        log::debug!("color adjust skipped: all steps zero");
        return buffer;
    }
    log::debug!(
        "color adjust: brightness={brightness} contrast={contrast} saturation={saturation}"
    );

    let stride = buffer.stride();
    buffer
        .as_raw_mut()
        .par_chunks_mut(stride)
        .for_each(|row| {
            for px in row.chunks_exact_mut(CHANNELS) {
                let rgb = [f64::from(px[0]), f64::from(px[1]), f64::from(px[2])];
                let [r, g, b] = tone.apply(rgb);
                px[0] = clamp_channel(r);
                px[1] = clamp_channel(g);
                px[2] = clamp_channel(b);
            }
        });

    buffer
}

/// Clamp to 0–255 and round half to even.
pub(crate) fn clamp_channel(v: f64) -> u8 {
    v.clamp(0.0, 255.0).round_ties_even() as u8
}
