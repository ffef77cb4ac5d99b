//! Gallery configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by a sparse user file, and the gallery data root can be moved
//! with the `DATA_ROOT` environment variable (handy for containers, where the
//! photo archive is a mounted volume).
//!
//! ## Configuration Options
//!
//! ```toml
//! # Every key is optional; these are the stock values
//!
//! data_root = "data"            # Gallery root: data.json + one folder per gallery
//! web_root = "wwwroot"          # Web-served root
//! photo_folder = "data/photo"   # Static photo folder, relative to web_root
//! manifest = "data.json"        # Gallery manifest filename inside data_root
//!
//! [images]
//! quality = 90                  # Lossy encoding quality (0-100)
//! mime_type = "image/jpeg"      # Default output format
//! max_size = 1200               # Longest edge for resized images
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Precedence
//!
//! ```text
//! stock defaults  <  config.toml  <  DATA_ROOT
//! ```
//!
//! Unknown keys are an error, so a misspelt key never silently falls back
//! to its default.

use crate::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides `data_root`.
pub const DATA_ROOT_ENV: &str = "DATA_ROOT";

/// Config filename looked up in the working directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration as read from `config.toml`.
///
/// A user file lists only the keys it changes; the rest keep their stock
/// values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Gallery root: holds the manifest and one subfolder per gallery.
    pub data_root: String,
    /// Web-served root directory.
    pub web_root: String,
    /// Folder of miscellaneous photos, relative to `web_root`.
    pub photo_folder: String,
    /// Manifest filename inside `data_root`.
    pub manifest: String,
    /// Output encoding defaults.
    pub images: ImagesConfig,
    /// Worker pool settings.
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            data_root: "data".to_string(),
            web_root: "wwwroot".to_string(),
            photo_folder: "data/photo".to_string(),
            manifest: "data.json".to_string(),
            images: ImagesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Check values the type system cannot: ranges, known mime types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality > 100 {
            return Err(ConfigError::Validation(format!(
                "images.quality must be 0-100, got {}",
                self.images.quality
            )));
        }
        if OutputFormat::from_mime(&self.images.mime_type).is_none() {
            return Err(ConfigError::Validation(format!(
                "images.mime_type '{}' has no encoder",
                self.images.mime_type
            )));
        }
        if self.images.max_size == 0 {
            return Err(ConfigError::Validation(
                "images.max_size must be non-zero".into(),
            ));
        }
        if self.manifest.trim().is_empty() {
            return Err(ConfigError::Validation("manifest must not be empty".into()));
        }
        Ok(())
    }

    /// Apply environment overrides, reading variables through `lookup`.
    ///
    /// An empty `DATA_ROOT` is treated as unset.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup(DATA_ROOT_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_root = root;
        }
        self
    }

    pub fn data_root_path(&self) -> PathBuf {
        PathBuf::from(&self.data_root)
    }

    pub fn web_root_path(&self) -> PathBuf {
        PathBuf::from(&self.web_root)
    }
}

/// Output encoding defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Lossy encoding quality (0 = worst, 100 = best).
    pub quality: u32,
    /// Mime type of generated images.
    pub mime_type: String,
    /// Longest edge, in pixels, of resized images.
    pub max_size: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            quality: 90,
            mime_type: "image/jpeg".to_string(),
            max_size: 1200,
        }
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel metadata-reading workers.
    /// Unset means one worker per CPU core; larger values are capped at the
    /// core count.
    pub max_processes: Option<usize>,
}

/// Number of worker threads to start: `max_processes` capped at the core
/// count, at least 1, or every core when unset.
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
// Loading and merging
// =============================================================================

/// [`SiteConfig::default`] as a TOML table, the bottom layer of every merge.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Deep-merge `overlay` into `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value
/// outright. Base keys missing from the overlay survive.
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

/// Load a config file as a raw TOML value.
///
/// A missing file is `Ok(None)`; a file that is not valid TOML is an error.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a file path, without environment overrides.
///
/// A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Load config from a file path and apply `DATA_ROOT` from the process
/// environment.
pub fn load_config_with_env(path: &Path) -> Result<SiteConfig, ConfigError> {
    Ok(load_config(path)?.with_env_overrides(|key| std::env::var(key).ok()))
}

/// Stock `config.toml` with every key commented, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# Photo Gallery Configuration
# ===========================
# Every setting is optional and shown with its default value.
# Delete what you don't change. Misspelt keys are reported as errors.

# Gallery root: contains the manifest and one subfolder per gallery.
# The DATA_ROOT environment variable overrides this value.
data_root = "data"

# Web-served root directory.
web_root = "wwwroot"

# Folder of miscellaneous photos, relative to web_root.
photo_folder = "data/photo"

# Gallery manifest (JSON array of {"Name", "Folder", "Icon"}) inside data_root.
manifest = "data.json"

# ---------------------------------------------------------------------------
# Output images
# ---------------------------------------------------------------------------
[images]
# Lossy encoding quality (0 = worst, 100 = best). Ignored by lossless formats.
quality = 90

# Output format: image/jpeg, image/png, image/gif, image/bmp, image/tiff,
# image/webp or image/avif.
mime_type = "image/jpeg"

# Longest edge, in pixels, of resized images.
max_size = 1200

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for reading photo metadata.
# Leave commented out to use one worker per CPU core.
# max_processes = 4
"##
}
