//! Shared test utilities: buffer fixtures and raster assertions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let input = gradient(9, 6);
//! let out = convolve(&input, &Kernel::from_sharpen(100));
//! assert_border_unchanged(&input, &out);
//! ```

use crate::buffer::PixelBuffer;

// =========================================================================
// Fixtures
// =========================================================================

/// Every pixel set to `rgba`.
pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> PixelBuffer {
    PixelBuffer::filled(width, height, rgba).unwrap()
}

/// Opaque buffer where every channel varies, so any resampling or filtering
/// mistake changes at least one byte.
pub fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            buf.put_pixel(
                x,
                y,
                [
                    ((x * 255) / width.max(2).saturating_sub(1)).min(255) as u8,
                    ((y * 255) / height.max(2).saturating_sub(1)).min(255) as u8,
                    ((x * 7 + y * 13) % 256) as u8,
                    255,
                ],
            );
        }
    }
    buf
}

/// Encode a buffer as PNG bytes, as an uploaded file would arrive.
pub fn png_bytes(buf: &PixelBuffer) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(buf.to_rgba_image())
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

// =========================================================================
// Assertions — panic with the first differing coordinate
// =========================================================================

/// Assert the outermost 1-pixel ring of `after` equals that of `before`.
pub fn assert_border_unchanged(before: &PixelBuffer, after: &PixelBuffer) {
    assert_eq!(before.dimensions(), after.dimensions());
    let (w, h) = before.dimensions();
    for y in 0..h {
        for x in 0..w {
            let on_border = x == 0 || y == 0 || x == w - 1 || y == h - 1;
            if on_border {
                assert_eq!(
                    before.pixel(x, y),
                    after.pixel(x, y),
                    "border pixel ({x}, {y}) changed"
                );
            }
        }
    }
}
