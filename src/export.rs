//! Output boundary: encode a processed result for download.
//!
//! The [`Encoder`] trait is the seam between "what file to produce" and
//! "which codec produces it". The production implementation is
//! [`RustEncoder`], built on the `image` crate's PNG and JPEG encoders.
//!
//! | Format | Encoder | Alpha |
//! |---|---|---|
//! | PNG | `image::codecs::png::PngEncoder` | kept |
//! | JPEG | `image::codecs::jpeg::JpegEncoder` at [`Quality`] | flattened onto black |
//!
//! Export only borrows the [`ProcessedResult`], so a failed export leaves it
//! intact for another attempt.

use crate::buffer::{CHANNELS, PixelBuffer};
use crate::config::ExportConfig;
use crate::imaging::{ExportFormat, ProcessedResult, Quality};
use image::ImageEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to export image")]
    EmptyOutput,
    #[error("Encoding failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Format and quality chosen for one export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Only used for JPEG.
    pub quality: Quality,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            format: config.format,
            quality: Quality::new(config.quality),
        }
    }
}

/// An encoded file ready to hand to the browser or write to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Trait for image encoders.
pub trait Encoder: Sync {
    /// Encode `buffer` in the requested format.
    fn encode(&self, buffer: &PixelBuffer, options: &ExportOptions)
    -> Result<Vec<u8>, ExportError>;
}

/// Pure Rust encoder using the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustEncoder;

impl RustEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder for RustEncoder {
    fn encode(
        &self,
        buffer: &PixelBuffer,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, ExportError> {
        let (width, height) = buffer.dimensions();
        let mut out = Vec::new();
        match options.format {
            ExportFormat::Png => PngEncoder::new(&mut out)
                .write_image(
                    buffer.as_raw(),
                    width,
                    height,
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| ExportError::Encode(format!("PNG encode failed: {e}")))?,
            ExportFormat::Jpeg => {
                let rgb = flatten_on_black(buffer);
                JpegEncoder::new_with_quality(&mut out, options.quality.value() as u8)
                    .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
                    .map_err(|e| ExportError::Encode(format!("JPEG encode failed: {e}")))?
            }
        }
        Ok(out)
    }
}

/// Drop alpha by compositing every pixel over opaque black.
fn flatten_on_black(buffer: &PixelBuffer) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(buffer.as_raw().len() / CHANNELS * 3);
    for px in buffer.pixels() {
        let a = u32::from(px[3]);
        for &c in &px[..3] {
            rgb.push(((u32::from(c) * a + 127) / 255) as u8);
        }
    }
    rgb
}

/// Download name: `<original-basename>-processed.<ext>`.
///
/// Only the last extension is stripped, and only when it contains no `/`.
///
/// # Examples
/// ```
/// # use photo_resizer::export::export_filename;
/// # use photo_resizer::imaging::ExportFormat;
/// assert_eq!(
///     export_filename("holiday.final.png", ExportFormat::Jpeg),
///     "holiday.final-processed.jpg"
/// );
/// assert_eq!(
///     export_filename("README", ExportFormat::Png),
///     "README-processed.png"
/// );
/// ```
pub fn export_filename(original: &str, format: ExportFormat) -> String {
    let stem = match original.rfind('.') {
        Some(dot) if dot + 1 < original.len() && !original[dot + 1..].contains('/') => {
            &original[..dot]
        }
        _ => original,
    };
    format!("{stem}-processed.{}", format.extension())
}

/// Encode `result` for download under a name derived from `original_filename`.
pub fn export_image(
    encoder: &impl Encoder,
    result: &ProcessedResult,
    original_filename: &str,
    options: &ExportOptions,
) -> Result<ExportedFile, ExportError> {
    let bytes = encoder
        .encode(result.buffer(), options)
        .inspect_err(|e| log::warn!("export of {original_filename} failed: {e}"))?;
    if bytes.is_empty() {
        log::warn!("export of {original_filename} produced no data");
        return Err(ExportError::EmptyOutput);
    }

    Ok(ExportedFile {
        filename: export_filename(original_filename, options.format),
        mime_type: options.format.mime_type(),
        bytes,
    })
}

/// Encode `result` and write it into `dir`, returning the written path.
pub fn write_export(
    encoder: &impl Encoder,
    result: &ProcessedResult,
    original_filename: &str,
    options: &ExportOptions,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let file = export_image(encoder, result, original_filename, options)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&file.filename);
    std::fs::write(&path, &file.bytes)?;
    log::info!("exported {} ({} bytes)", path.display(), file.bytes.len());
    Ok(path)
}
