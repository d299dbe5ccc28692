//! Editor configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [upload]
//! max_bytes = 52428800      # 50 MiB
//! accepted_types = ["image/jpeg", "image/png", "image/webp"]
//!
//! [export]
//! format = "jpeg"           # "png" or "jpeg"
//! quality = 90              # JPEG quality (1-100)
//!
//! [processing]
//! max_threads = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::ExportFormat;
use crate::upload::{MAX_UPLOAD_BYTES, SUPPORTED_TYPES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Upload limits.
    pub upload: UploadConfig,
    /// Export defaults.
    pub export: ExportConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "upload.max_bytes must be positive".into(),
            ));
        }
        if self.upload.accepted_types.is_empty() {
            return Err(ConfigError::Validation(
                "upload.accepted_types must not be empty".into(),
            ));
        }
        if let Some(t) = self
            .upload
            .accepted_types
            .iter()
            .find(|t| !SUPPORTED_TYPES.contains(&t.as_str()))
        {
            return Err(ConfigError::Validation(format!(
                "upload.accepted_types: unsupported type {t:?}"
            )));
        }
        if !(1..=100).contains(&self.export.quality) {
            return Err(ConfigError::Validation(
                "export.quality must be 1-100".into(),
            ));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Upload limits enforced before decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Largest accepted file, in bytes.
    pub max_bytes: u64,
    /// Mime types accepted from the file picker.
    pub accepted_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: MAX_UPLOAD_BYTES,
            accepted_types: SUPPORTED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Export defaults offered to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub format: ExportFormat,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: 90,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of worker threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Build a standalone rayon pool sized from processing config.
///
/// Run work inside it with [`rayon::ThreadPool::install`].
pub fn build_thread_pool(
    config: &ProcessingConfig,
) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(effective_threads(config))
        .build()
}

/// Initialize the global rayon pool from processing config.
///
/// Only the first initialization in a process takes effect, including the
/// implicit one rayon performs on first use. Returns whether this call did.
pub fn init_thread_pool(config: &ProcessingConfig) -> bool {
    let threads = effective_threads(config);
    let initialized = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .is_ok();
    if initialized {
        log::debug!("rayon pool: {threads} threads");
    } else {
        log::debug!(
            "rayon pool already running with {} threads",
            rayon::current_num_threads()
        );
    }
    initialized
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(EditorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<EditorConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<EditorConfig, ConfigError> {
    resolve_config(load_raw_config(dir)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
pub fn stock_config_toml() -> &'static str {
    r##"# Photo Resizer Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Upload limits
# ---------------------------------------------------------------------------
[upload]
# Largest accepted file in bytes (50 MiB).
max_bytes = 52428800

# Accepted mime types. Any subset of the three supported ones.
accepted_types = ["image/jpeg", "image/png", "image/webp"]

# ---------------------------------------------------------------------------
# Export defaults
# ---------------------------------------------------------------------------
[export]
# "png" (lossless, keeps transparency) or "jpeg".
format = "jpeg"

# JPEG quality (1 = worst, 100 = best). Ignored for PNG.
quality = 90

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum worker threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = EditorConfig::default();
        assert_eq!(config.upload.max_bytes, 50 * 1024 * 1024);
        assert_eq!(
            config.upload.accepted_types,
            vec!["image/jpeg", "image/png", "image/webp"]
        );
        assert_eq!(config.export.format, ExportFormat::Jpeg);
        assert_eq!(config.export.quality, 90);
        assert_eq!(config.processing.max_threads, None);
        config.validate().unwrap();
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[export]
format = "png"
"#;
        let config: EditorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.export.format, ExportFormat::Png);
        // Default values preserved
        assert_eq!(config.export.quality, 90);
        assert_eq!(config.upload.max_bytes, MAX_UPLOAD_BYTES);
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
[export]
qualty = 80
"#;
        assert!(toml::from_str::<EditorConfig>(toml).is_err());
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config: EditorConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    // =========================================================================
    // validate
    // =========================================================================

    #[test]
    fn validate_rejects_quality_out_of_range() {
        let mut config = EditorConfig::default();
        config.export.quality = 0;
        assert!(config.validate().is_err());
        config.export.quality = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unsupported_type() {
        let mut config = EditorConfig::default();
        config.upload.accepted_types.push("image/gif".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("image/gif"));
    }

    #[test]
    fn validate_rejects_empty_types_and_zero_size() {
        let mut config = EditorConfig::default();
        config.upload.accepted_types.clear();
        assert!(config.validate().is_err());

        let mut config = EditorConfig::default();
        config.upload.max_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_type_subset() {
        let mut config = EditorConfig::default();
        config.upload.accepted_types = vec!["image/png".into()];
        config.validate().unwrap();
    }

    // =========================================================================
    // merge / load
    // =========================================================================

    #[test]
    fn merge_overrides_leaf_and_keeps_siblings() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[export]\nquality = 70").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["export"]["quality"].as_integer(), Some(70));
        assert_eq!(merged["export"]["format"].as_str(), Some("jpeg"));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_config(tmp.path()).unwrap(), EditorConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[upload]\nmax_bytes = 1024\n\n[processing]\nmax_threads = 2\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.upload.max_bytes, 1024);
        assert_eq!(config.processing.max_threads, Some(2));
        assert_eq!(config.export.quality, 90);
    }

    #[test]
    fn load_config_validates() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[export]\nquality = 0\n").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_config_invalid_toml_errors() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "[export\n").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn build_thread_pool_honors_max_threads() {
        let config = ProcessingConfig {
            max_threads: Some(1),
        };
        let pool = build_thread_pool(&config).unwrap();
        assert_eq!(pool.current_num_threads(), 1);
        assert_eq!(pool.install(rayon::current_num_threads), 1);
    }

    #[test]
    fn init_thread_pool_only_takes_effect_once() {
        let config = ProcessingConfig::default();
        init_thread_pool(&config);
        // The global pool exists now, whoever built it.
        assert!(!init_thread_pool(&config));
        assert!(rayon::current_num_threads() >= 1);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
        let capped = ProcessingConfig {
            max_threads: Some(cores + 100),
        };
        assert_eq!(effective_threads(&capped), cores);
        let one = ProcessingConfig {
            max_threads: Some(1),
        };
        assert_eq!(effective_threads(&one), 1);
    }
}
