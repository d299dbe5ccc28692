//! Resizer: composite a source into a fresh canvas of the target size.
//!
//! Geometry comes from [`calculate_draw_rect`]. Each destination pixel is
//! the square `[x, x+1) × [y, y+1)`; the fraction of that square covered by
//! the draw rectangle scales the sampled alpha, so fractional edges blend
//! into the background instead of snapping. Sampling is bilinear on
//! premultiplied RGBA with clamp-to-edge addressing, and the result is
//! composited source-over onto the background (opaque white for contain,
//! transparent for cover).

use super::ImagingError;
use super::calculations::{DrawRect, calculate_draw_rect};
use super::params::ResizeMode;
use crate::buffer::{CHANNELS, PixelBuffer, SourceImage};
use rayon::prelude::*;

const WHITE: [f64; 4] = [255.0, 255.0, 255.0, 255.0];
const TRANSPARENT: [f64; 4] = [0.0; 4];

/// Resize `source` into an exactly `target_width × target_height` buffer.
///
/// Zero target dimensions are rejected before any ratio is computed or any
/// pixel allocated.
pub fn resize(
    source: &SourceImage,
    target_width: u32,
    target_height: u32,
    mode: ResizeMode,
) -> Result<PixelBuffer, ImagingError> {
    if target_width == 0 || target_height == 0 {
        return Err(ImagingError::InvalidDimensions {
            width: target_width,
            height: target_height,
        });
    }

    let rect = calculate_draw_rect(
        source.dimensions(),
        (target_width, target_height),
        mode,
    );
    log::debug!(
        "resize {}x{} -> {}x{} ({:?}): draw {:.3}x{:.3} at ({:.3}, {:.3})",
        source.width(),
        source.height(),
        target_width,
        target_height,
        mode,
        rect.width,
        rect.height,
        rect.x,
        rect.y
    );

    // Same-size cover draws the source onto the canvas exactly, with nothing
    // underneath to composite against.
    if mode == ResizeMode::Cover && source.dimensions() == (target_width, target_height) {
        return Ok(source.pixels().clone());
    }

    let background = match mode {
        ResizeMode::Contain => WHITE,
        ResizeMode::Cover => TRANSPARENT,
    };

    let mut canvas = PixelBuffer::new(target_width, target_height)?;
    let stride = canvas.stride();
    let sampler = Sampler::new(source.pixels(), rect);

    canvas
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let px = sampler.composite(x as f64, y as f64, background);
                out.copy_from_slice(&px);
            }
        });

    Ok(canvas)
}

/// Maps canvas coordinates into the source and samples it.
struct Sampler<'a> {
    src: &'a PixelBuffer,
    rect: DrawRect,
    scale_x: f64,
    scale_y: f64,
}

impl<'a> Sampler<'a> {
    fn new(src: &'a PixelBuffer, rect: DrawRect) -> Self {
        Self {
            src,
            rect,
            scale_x: f64::from(src.width()) / rect.width,
            scale_y: f64::from(src.height()) / rect.height,
        }
    }

    /// Final RGBA of canvas pixel `(x, y)` over `background`.
    fn composite(&self, x: f64, y: f64, background: [f64; 4]) -> [u8; 4] {
        let coverage = overlap(x, self.rect.x, self.rect.width)
            * overlap(y, self.rect.y, self.rect.height);
        if coverage <= 0.0 {
            return to_u8(background);
        }

        // Pixel centre, clamped into the draw rect so partially covered
        // edge pixels sample the nearest source edge.
        let cx = (x + 0.5).clamp(self.rect.x, self.rect.x + self.rect.width);
        let cy = (y + 0.5).clamp(self.rect.y, self.rect.y + self.rect.height);
        let u = (cx - self.rect.x) * self.scale_x - 0.5;
        let v = (cy - self.rect.y) * self.scale_y - 0.5;

        let [pr, pg, pb, pa] = self.bilinear_premultiplied(u, v);
        let src_a = pa / 255.0 * coverage;
        let src_rgb = [pr * coverage, pg * coverage, pb * coverage];

        // Source-over with premultiplied source
        let bg_a = background[3] / 255.0;
        let out_a = src_a + bg_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return [0, 0, 0, 0];
        }
        let mut out = [0.0; 4];
        for c in 0..3 {
            let premul = src_rgb[c] + background[c] * bg_a * (1.0 - src_a);
            out[c] = premul / out_a;
        }
        out[3] = out_a * 255.0;
        to_u8(out)
    }

    /// Bilinear sample at source coordinates `(u, v)`, returning
    /// premultiplied RGB (0–255 scale) and straight alpha (0–255).
    fn bilinear_premultiplied(&self, u: f64, v: f64) -> [f64; 4] {
        let max_x = f64::from(self.src.width() - 1);
        let max_y = f64::from(self.src.height() - 1);
        let u = u.clamp(0.0, max_x);
        let v = v.clamp(0.0, max_y);

        let x0 = u.floor();
        let y0 = v.floor();
        let fx = u - x0;
        let fy = v - y0;
        let x1 = (x0 + 1.0).min(max_x);
        let y1 = (y0 + 1.0).min(max_y);

        let taps = [
            (x0, y0, (1.0 - fx) * (1.0 - fy)),
            (x1, y0, fx * (1.0 - fy)),
            (x0, y1, (1.0 - fx) * fy),
            (x1, y1, fx * fy),
        ];

        let mut acc = [0.0; 4];
        for (sx, sy, w) in taps {
            if w == 0.0 {
                continue;
            }
            let [r, g, b, a] = self.src.pixel(sx as u32, sy as u32);
            let alpha = f64::from(a) / 255.0;
            acc[0] += f64::from(r) * alpha * w;
            acc[1] += f64::from(g) * alpha * w;
            acc[2] += f64::from(b) * alpha * w;
            acc[3] += f64::from(a) * w;
        }
        acc
    }
}

/// Length of `[p, p+1) ∩ [start, start+len)`.
fn overlap(p: f64, start: f64, len: f64) -> f64 {
    ((p + 1.0).min(start + len) - p.max(start)).clamp(0.0, 1.0)
}

fn to_u8(px: [f64; 4]) -> [u8; 4] {
    px.map(|v| v.clamp(0.0, 255.0).round_ties_even() as u8)
}
