//! Pipeline configuration module.
//!
//! Handles loading, validating, and merging `slidefill.toml`. Stock defaults
//! are the base layer; a user file overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [processing]
//! concurrency = 3           # Transforms in flight at once (clamped to CPU cores)
//!
//! [output]
//! format = "png"            # "png" keeps transparency, "jpeg" flattens it
//! jpeg_quality = 90         # 1-100, only used for jpeg
//!
//! [resample]
//! filter = "lanczos3"       # nearest, triangle, catmull-rom, gaussian, lanczos3
//!
//! [debug]
//! effects = false           # Add "debug: ..." entries to the effect log
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [output]
//! format = "jpeg"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{EngineSettings, OutputFormat, Quality, ResampleFilter};
use crate::process::{BatchOptions, DEFAULT_CONCURRENCY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "slidefill.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `slidefill.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Batch concurrency.
    pub processing: ProcessingConfig,
    /// Encoding of transformed canvases.
    pub output: OutputConfig,
    /// Scaling filter.
    pub resample: ResampleConfig,
    /// Diagnostics.
    pub debug: DebugConfig,
}

/// Parallel processing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of transforms in flight at once.
    /// Values larger than the core count are clamped down.
    pub concurrency: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Resolve the effective batch width from config.
///
/// `min(concurrency, cores)`, never below 1. The user can constrain down, not up.
pub fn effective_concurrency(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.concurrency.min(cores).max(1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub jpeg_quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            jpeg_quality: 90,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResampleConfig {
    pub filter: ResampleFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    /// Record `debug:` diagnostics in every transform's effect log.
    pub effects: bool,
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.concurrency == 0 {
            return Err(ConfigError::Validation(
                "processing.concurrency must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            format: self.output.format,
            quality: Quality::new(self.output.jpeg_quality),
            filter: self.resample.filter,
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            concurrency: effective_concurrency(&self.processing),
            debug: self.debug.effects,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PipelineConfig::default())?)
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

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is missing.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    resolve_config(overlay)
}

/// Returns a fully-commented stock `slidefill.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# slidefill configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Each key only needs to be present if you want to override it.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of pictures transformed at once. A batch is split into
# chunks of this size; each chunk finishes before the next one starts.
# Values above the number of CPU cores are clamped down.
concurrency = 3

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# "png" keeps the transparent padding around offset pictures.
# "jpeg" is smaller but flattens transparency to black.
format = "png"

# JPEG encoding quality (1 = worst, 100 = best). Ignored for png.
jpeg_quality = 90

# ---------------------------------------------------------------------------
# Resampling
# ---------------------------------------------------------------------------
[resample]
# Filter used when scaling to the display area:
# nearest, triangle, catmull-rom, gaussian, lanczos3
filter = "lanczos3"

# ---------------------------------------------------------------------------
# Debugging
# ---------------------------------------------------------------------------
[debug]
# Add "debug: ..." entries (source size, display size, placement) to the
# effect log of every transform.
effects = false
"##
}
