//! The processing pipeline.
//!
//! Resize → color adjust → sharpen → smoothing, always in that order. Every
//! stage owns its buffer and hands it to the next; nothing survives between
//! calls, so the same source and parameters always give the same bytes.

use super::ImagingError;
use super::color::adjust_colors;
use super::convolution::{Kernel, convolve};
use super::params::ProcessingParams;
use super::resize::resize;
use crate::buffer::{PixelBuffer, SourceImage};

/// Final raster of one pipeline run. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedResult {
    buffer: PixelBuffer,
}

impl ProcessedResult {
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }
}

/// Run the full pipeline on `source`.
///
/// Only the target dimensions are validated here. Adjustment values are
/// trusted to be in range; see [`ProcessingParams::clamped`].
pub fn process(
    source: &SourceImage,
    params: &ProcessingParams,
) -> Result<ProcessedResult, ImagingError> {
    let resized = resize(source, params.width, params.height, params.resize_mode)?;
    let mut buffer = adjust_colors(
        resized,
        params.brightness,
        params.contrast,
        params.saturation,
    );

    if params.sharpen > 0 {
        log::debug!("sharpen {}", params.sharpen);
        buffer = convolve(&buffer, &Kernel::from_sharpen(params.sharpen));
    }

    if params.smoothing > 0 {
        log::debug!("smoothing {}", params.smoothing);
        buffer = convolve(&buffer, &Kernel::from_smoothing(params.smoothing));
    }

    Ok(ProcessedResult { buffer })
}
