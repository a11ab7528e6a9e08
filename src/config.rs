//! Tool configuration.
//!
//! Handles loading, validating, and merging `shotcrop.toml`. Stock defaults
//! are the base layer; a user config file overrides only the keys it names.
//!
//! ## Config File Location
//!
//! `shotcrop.toml` in the working directory, or any file passed with
//! `--config PATH`. A missing default file means stock defaults; a missing
//! `--config` file is an error.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [selection]
//! cut_height = 130                        # Pixels shaved off the top in fixed-offset mode
//!
//! [output]
//! archive_name = "cleaned_screenshots.zip"
//! jpeg_quality = 90                       # 1-100
//! compression = "deflated"                # or "stored"
//!
//! [processing]
//! max_processes = 4                       # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::archive::Compression;
use crate::imaging::Quality;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "shotcrop.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `shotcrop.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    /// Default selection for fixed-offset mode.
    pub selection: SelectionConfig,
    /// Archive and encoder settings.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl CropConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.output.archive_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.archive_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// JPEG quality as the encoder parameter.
    pub fn quality(&self) -> Quality {
        Quality::new(self.output.jpeg_quality)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    /// Pixels removed from the top of every image in fixed-offset mode.
    pub cut_height: u32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { cut_height: 130 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File name of the downloadable archive.
    pub archive_name: String,
    /// Quality for JPEG re-encoding (1 = worst, 100 = best).
    pub jpeg_quality: u32,
    pub compression: Compression,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            archive_name: "cleaned_screenshots.zip".to_string(),
            jpeg_quality: 90,
            compression: Compression::Deflated,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(CropConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key-by-key; any other overlay value replaces the base value.
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

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<CropConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: CropConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// An explicit path must exist. Without one, `shotcrop.toml` in `dir` is
/// used when present and stock defaults otherwise.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<CropConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let default_path = dir.join(CONFIG_FILE_NAME);
            if default_path.exists() {
                Some(load_raw_config(&default_path)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}

/// A fully-commented stock `shotcrop.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r#"# shotcrop configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Selection
# ---------------------------------------------------------------------------
[selection]
# Pixels removed from the top of every image when no --rect is given.
# Typical phone status bars are 100-160 px tall.
cut_height = 130

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# File name of the archive written when --output is not given.
archive_name = "cleaned_screenshots.zip"

# JPEG re-encoding quality (1 = worst, 100 = best). PNG output is lossless.
jpeg_quality = 90

# Zip entry compression: "deflated" or "stored".
compression = "deflated"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"#
}
