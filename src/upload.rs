//! Input boundary: validate and decode an uploaded file.
//!
//! Checks run cheapest first (mime type, byte size) so oversized or
//! unsupported files are rejected before any decoding. Only JPEG, PNG and
//! WebP are decoded, whatever the `image` crate could otherwise read.
//! Error messages are written for the person who dropped the file.

use crate::buffer::{PixelBuffer, SourceImage};
use crate::config::UploadConfig;
use image::{ImageFormat, ImageReader};
use serde::Serialize;
use std::io::Cursor;
use thiserror::Error;

/// Mime types the decoder supports.
pub const SUPPORTED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Default upload size limit: 50 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Please upload a JPG, PNG, or WebP image file.")]
    UnsupportedType(String),
    #[error("File size must be less than {}MB.", .limit / (1024 * 1024))]
    TooLarge { size: u64, limit: u64 },
    #[error("Failed to load image. Please try another file.")]
    Decode(String),
}

/// What the front end shows about the loaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub filename: String,
    pub byte_size: u64,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

/// A decoded upload and its metadata.
#[derive(Debug, Clone)]
pub struct Upload {
    pub source: SourceImage,
    pub metadata: UploadMetadata,
}

/// Reject files by declared type and size, without looking at the bytes.
pub fn validate_upload(
    mime_type: &str,
    byte_size: u64,
    config: &UploadConfig,
) -> Result<(), UploadError> {
    if !config.accepted_types.iter().any(|t| t == mime_type) {
        return Err(UploadError::UnsupportedType(mime_type.to_string()));
    }
    if byte_size > config.max_bytes {
        return Err(UploadError::TooLarge {
            size: byte_size,
            limit: config.max_bytes,
        });
    }
    Ok(())
}

/// Validate and decode an uploaded file into a [`SourceImage`].
pub fn load_upload(
    filename: &str,
    mime_type: &str,
    bytes: &[u8],
    config: &UploadConfig,
) -> Result<Upload, UploadError> {
    validate_upload(mime_type, bytes.len() as u64, config).inspect_err(|e| {
        log::warn!("rejected upload {filename}: {e}");
    })?;

    let source = decode(bytes).inspect_err(|e| {
        if let UploadError::Decode(reason) = e {
            log::warn!("failed to decode {filename}: {reason}");
        }
    })?;

    let (width, height) = source.dimensions();
    log::debug!(
        "loaded {filename} ({mime_type}, {} bytes, {width}x{height})",
        bytes.len()
    );

    Ok(Upload {
        source,
        metadata: UploadMetadata {
            filename: filename.to_string(),
            byte_size: bytes.len() as u64,
            mime_type: mime_type.to_string(),
            width,
            height,
        },
    })
}

/// Decode JPEG, PNG or WebP bytes, sniffing the real format from content.
fn decode(bytes: &[u8]) -> Result<SourceImage, UploadError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| UploadError::Decode(e.to_string()))?;

    match reader.format() {
        Some(ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP) => {}
        other => {
            return Err(UploadError::Decode(format!(
                "unsupported content format: {other:?}"
            )));
        }
    }

    let rgba = reader
        .decode()
        .map_err(|e| UploadError::Decode(e.to_string()))?
        .to_rgba8();
    PixelBuffer::try_from(rgba)
        .map(SourceImage::new)
        .map_err(|e| UploadError::Decode(e.to_string()))
}
