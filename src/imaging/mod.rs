//! Pixel processing — pure Rust, all in memory.
//!
//! | Stage | Module |
//! |---|---|
//! | **Fit geometry** | [`calculations`]: contain/cover draw rectangle, aspect lock |
//! | **Resize** | [`resize`]: bilinear composite onto a fresh canvas |
//! | **Tone** | [`color`]: brightness → contrast → saturation |
//! | **Filters** | [`convolution`]: 3×3 sharpen and smoothing kernels |
//! | **Pipeline** | [`pipeline`]: runs the stages in order |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for geometry (unit testable)
//! - **Parameters**: Data structures describing a run
//! - **Stages**: One function per stage, each taking and returning owned buffers
//! - **Pipeline**: The fixed sequence of stages

mod calculations;
pub mod color;
pub mod convolution;
mod params;
pub mod pipeline;
pub mod resize;

use thiserror::Error;

pub use calculations::{DrawRect, calculate_draw_rect, linked_height, linked_width};
pub use color::{ToneAdjustment, adjust_colors};
pub use convolution::{Kernel, convolve};
pub use params::{
    ExportFormat, FILTER_MAX, ProcessingParams, Quality, ResizeMode, TONE_RANGE,
};
pub use pipeline::{ProcessedResult, process};
pub use resize::resize;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Invalid dimensions: {width}x{height} (both must be positive)")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Decode failed: {0}")]
    Decode(#[from] image::ImageError),
}
