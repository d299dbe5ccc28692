//! Pure calculation functions for fit geometry.
//!
//! All functions here are pure and testable without any pixels.

use super::params::ResizeMode;

/// Where the source image lands on the target canvas, in canvas pixels.
///
/// Offsets may be negative (cover mode draws past the canvas edges) and
/// every field may be fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawRect {
    /// True when the rectangle is exactly the `width × height` canvas.
    pub fn is_full_bleed(&self, width: u32, height: u32) -> bool {
        self.x == 0.0
            && self.y == 0.0
            && self.width == f64::from(width)
            && self.height == f64::from(height)
    }
}

/// Calculate the draw rectangle for a source under the given fit mode.
///
/// Both dimension pairs must be non-zero; callers validate first.
///
/// - **Contain**: a wider source keeps the target width and gets height
///   `target_w / source_ratio`, centred vertically; otherwise it keeps the
///   target height, gets width `target_h * source_ratio`, centred horizontally.
/// - **Cover**: the mirror image. A wider source gets width
///   `target_h * source_ratio` and is cropped left/right, otherwise height
///   `target_w / source_ratio` cropped top/bottom.
///
/// # Examples
/// ```
/// # use photo_resizer::imaging::{calculate_draw_rect, ResizeMode};
/// // 400x100 (4:1) into 200x200, contain → 200x50 band centred vertically
/// let r = calculate_draw_rect((400, 100), (200, 200), ResizeMode::Contain);
/// assert_eq!((r.x, r.y, r.width, r.height), (0.0, 75.0, 200.0, 50.0));
/// ```
pub fn calculate_draw_rect(source: (u32, u32), target: (u32, u32), mode: ResizeMode) -> DrawRect {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = (f64::from(target.0), f64::from(target.1));

    let mut rect = DrawRect {
        x: 0.0,
        y: 0.0,
        width: tgt_w,
        height: tgt_h,
    };

    // Equal ratios, compared exactly; the float quotients can be an ulp apart.
    if u64::from(src_w) * u64::from(target.1) == u64::from(target.0) * u64::from(src_h) {
        return rect;
    }

    let source_ratio = f64::from(src_w) / f64::from(src_h);
    let target_ratio = tgt_w / tgt_h;

    match mode {
        ResizeMode::Contain => {
            if source_ratio > target_ratio {
                // Source is wider: letterbox top and bottom
                rect.height = tgt_w / source_ratio;
                rect.y = (tgt_h - rect.height) / 2.0;
            } else {
                // Source is taller (or equal): pillarbox left and right
                rect.width = tgt_h * source_ratio;
                rect.x = (tgt_w - rect.width) / 2.0;
            }
        }
        ResizeMode::Cover => {
            if source_ratio > target_ratio {
                // Source is wider: trim the sides
                rect.width = tgt_h * source_ratio;
                rect.x = (tgt_w - rect.width) / 2.0;
            } else {
                // Source is taller (or equal): trim top and bottom
                rect.height = tgt_w / source_ratio;
                rect.y = (tgt_h - rect.height) / 2.0;
            }
        }
    }

    rect
}

/// Height that keeps `source` proportions for a new width.
///
/// Rounds half away from zero.
///
/// # Examples
/// ```
/// # use photo_resizer::imaging::linked_height;
/// assert_eq!(linked_height((1920, 1080), 1280), 720);
/// ```
pub fn linked_height(source: (u32, u32), width: u32) -> u32 {
    let aspect = f64::from(source.0) / f64::from(source.1);
    (f64::from(width) / aspect).round() as u32
}

/// Width that keeps `source` proportions for a new height.
pub fn linked_width(source: (u32, u32), height: u32) -> u32 {
    let aspect = f64::from(source.0) / f64::from(source.1);
    (f64::from(height) * aspect).round() as u32
}
