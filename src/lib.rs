//! # Photo Resizer
//!
//! The processing core of an interactive photo editor: resize an uploaded
//! photo to target dimensions under a fit mode, adjust its tone, sharpen or
//! smooth it, and export the result as PNG or JPEG.
//!
//! # Architecture: A Fixed Pipeline
//!
//! Every run is a pure function of one source image and one parameter set:
//!
//! ```text
//! upload ─▶ SourceImage ─┐
//!                        ├─▶ resize ─▶ adjust colors ─▶ sharpen ─▶ smooth ─▶ ProcessedResult ─▶ export
//! ProcessingParams ──────┘
//! ```
//!
//! - **Resize** composites the source into a fresh canvas (contain or cover).
//! - **Adjust colors** applies brightness, then contrast, then saturation.
//! - **Sharpen / smooth** are 3×3 convolutions, each skipped at strength 0.
//!
//! No state survives between runs, so the same inputs always produce the
//! same bytes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`buffer`] | `PixelBuffer` (owned RGBA8 raster) and the immutable `SourceImage` |
//! | [`imaging`] | Fit geometry, resize, color adjustment, convolution, the pipeline |
//! | [`upload`] | Input boundary: mime type and size checks, decoding |
//! | [`export`] | Output boundary: PNG/JPEG encoding, download filename |
//! | [`worker`] | Off-thread processing where the last request wins |
//! | [`config`] | `config.toml` loading, validation, merging, thread pool sizing |
//!
//! # Design Decisions
//!
//! ## Owned Buffers Between Stages
//!
//! Each stage takes a buffer and returns one. Convolution always reads from
//! its input and writes a new output, so no pixel ever sees a neighbour that
//! was already filtered.
//!
//! ## Row-Parallel, Still Deterministic
//!
//! Resize, color adjustment and convolution split work by output row with
//! rayon. Each row is written by exactly one task from immutable input, so
//! the thread count never changes the result.
//!
//! ## Boundaries Validate, the Pipeline Trusts
//!
//! Slider ranges are clamped at the parameter boundary
//! ([`imaging::ProcessingParams::clamped`]) and uploads are checked in
//! [`upload`]. The pipeline itself only rejects zero target dimensions,
//! before allocating anything.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding and encoding go through the `image` crate with only the JPEG,
//! PNG and WebP codecs enabled. No system libraries are needed.

pub mod buffer;
pub mod config;
pub mod export;
pub mod imaging;
pub mod upload;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_helpers;
