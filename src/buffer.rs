//! Raster buffers shared by every stage.
//!
//! [`PixelBuffer`] is the owned RGBA8 substrate all operations read and
//! write: row-major, four bytes per pixel, dimensions fixed at creation.
//! [`SourceImage`] wraps one for the decoded upload and only hands out
//! shared references, so the pipeline can never mutate it.

use crate::imaging::ImagingError;
use image::RgbaImage;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// Owned RGBA raster with 8 bits per channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a fully transparent black buffer.
    ///
    /// Zero dimensions are rejected before anything is allocated.
    pub fn new(width: u32, height: u32) -> Result<Self, ImagingError> {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    /// Allocate a buffer with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, ImagingError> {
        let len = byte_len(width, height)?;
        let data = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap raw RGBA bytes. The length must be exactly `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImagingError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(ImagingError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of bytes in one row.
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// RGBA of the pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset(x, y);
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgba);
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(CHANNELS)
    }

    /// Copy into an `image` crate buffer for encoding.
    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .expect("buffer length is checked on construction")
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

impl TryFrom<RgbaImage> for PixelBuffer {
    type Error = ImagingError;

    fn try_from(img: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = img.dimensions();
        Self::from_raw(width, height, img.into_raw())
    }
}

fn byte_len(width: u32, height: u32) -> Result<usize, ImagingError> {
    if width == 0 || height == 0 {
        return Err(ImagingError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(CHANNELS))
        .ok_or(ImagingError::InvalidDimensions { width, height })
}

/// Immutable decoded upload, created once and read by every pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pixels: PixelBuffer,
}

impl SourceImage {
    pub fn new(pixels: PixelBuffer) -> Self {
        Self { pixels }
    }

    /// Decode any image the `image` crate was built to read.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImagingError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        PixelBuffer::try_from(rgba).map(Self::new)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

impl From<PixelBuffer> for SourceImage {
    fn from(pixels: PixelBuffer) -> Self {
        Self::new(pixels)
    }
}
