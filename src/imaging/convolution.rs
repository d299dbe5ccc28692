//! ConvolutionFilter: 3×3 kernels over the color channels.
//!
//! [`convolve`] always reads from its input and writes into a freshly
//! allocated output, so no pixel ever sees a neighbour that was already
//! filtered in the same pass. The outermost 1-pixel ring is copied through
//! unchanged and alpha is copied for every pixel.

use super::color::clamp_channel;
use crate::buffer::{CHANNELS, PixelBuffer};
use rayon::prelude::*;

/// Row-major 3×3 weights; `weights[1][1]` is the centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel {
    pub weights: [[f64; 3]; 3],
}

impl Kernel {
    /// Laplacian-style sharpen: centre `1 + 4a`, orthogonal neighbours `-a`,
    /// diagonals `0`.
    #[rustfmt::skip]
    pub fn sharpen(amount: f64) -> Self {
        let a = amount;
        Self {
            weights: [
                [0.0, -a, 0.0],
                [-a, 1.0 + 4.0 * a, -a],
                [0.0, -a, 0.0],
            ],
        }
    }

    /// Partial box blur: every neighbour `a/9`, centre `1 - 8a/9`.
    #[rustfmt::skip]
    pub fn smoothing(amount: f64) -> Self {
        let k = amount / 9.0;
        Self {
            weights: [
                [k, k, k],
                [k, 1.0 - 8.0 * k, k],
                [k, k, k],
            ],
        }
    }

    /// Sharpen kernel for a 0–100 slider value.
    pub fn from_sharpen(sharpen: u32) -> Self {
        Self::sharpen(f64::from(sharpen) / 100.0)
    }

    /// Smoothing kernel for a 0–100 slider value.
    pub fn from_smoothing(smoothing: u32) -> Self {
        Self::smoothing(f64::from(smoothing) / 100.0)
    }
}

/// Convolve `input` with `kernel`, returning a new buffer of the same size.
///
/// Buffers narrower or shorter than 3 pixels have no interior and come back
/// as an unchanged copy.
pub fn convolve(input: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let mut output = input.clone();
    let (width, height) = (input.width() as usize, input.height() as usize);
    if width < 3 || height < 3 {
        return output;
    }

    let stride = input.stride();
    let src = input.as_raw();
    let w = &kernel.weights;

    output
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .skip(1)
        .take(height - 2)
        .for_each(|(y, row)| {
            let above = &src[(y - 1) * stride..y * stride];
            let here = &src[y * stride..(y + 1) * stride];
            let below = &src[(y + 1) * stride..(y + 2) * stride];

            for x in 1..width - 1 {
                for c in 0..3 {
                    let left = (x - 1) * CHANNELS + c;
                    let mid = x * CHANNELS + c;
                    let right = (x + 1) * CHANNELS + c;

                    let sum = f64::from(above[left]) * w[0][0]
                        + f64::from(above[mid]) * w[0][1]
                        + f64::from(above[right]) * w[0][2]
                        + f64::from(here[left]) * w[1][0]
                        + f64::from(here[mid]) * w[1][1]
                        + f64::from(here[right]) * w[1][2]
                        + f64::from(below[left]) * w[2][0]
                        + f64::from(below[mid]) * w[2][1]
                        + f64::from(below[right]) * w[2][2];

                    row[mid] = clamp_channel(sum);
                }
            }
        });

    output
}
