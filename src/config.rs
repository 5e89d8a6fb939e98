//! Tool configuration.
//!
//! Controls which ImageMagick executables are invoked and how long a single
//! invocation may run. Values come from stock defaults, optionally overridden
//! by a `magick-resize.toml` file:
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! flavor = "auto"               # auto | legacy | magick7
//! convert_program = "convert"   # used by the legacy flavor
//! identify_program = "identify" # used by the legacy flavor
//! magick_program = "magick"     # used by the magick7 flavor
//! timeout_secs = 60             # 0 disables the timeout
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "magick-resize.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Which generation of the ImageMagick command-line interface to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolFlavor {
    /// Use `magick` when it runs, otherwise fall back to `convert`/`identify`.
    #[default]
    Auto,
    /// ImageMagick 6: separate `convert` and `identify` executables.
    Legacy,
    /// ImageMagick 7: a single `magick` executable with subcommands.
    Magick7,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub flavor: ToolFlavor,
    pub convert_program: String,
    pub identify_program: String,
    pub magick_program: String,
    /// Seconds a single invocation may run before it is killed.
    /// `0` waits indefinitely.
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            flavor: ToolFlavor::Auto,
            convert_program: "convert".to_string(),
            identify_program: "identify".to_string(),
            magick_program: "magick".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ToolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("convert_program", &self.convert_program),
            ("identify_program", &self.identify_program),
            ("magick_program", &self.magick_program),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    /// Per-invocation deadline, `None` when `timeout_secs = 0`.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
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

/// Load `magick-resize.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `magick-resize.toml` in `dir`, layered over stock defaults.
pub fn load_config(dir: &Path) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `magick-resize.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# magick-resize configuration
# ===========================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Which ImageMagick command-line interface to drive:
#   "auto"    - use `magick` if it runs, otherwise `convert` / `identify`
#   "legacy"  - ImageMagick 6: `convert` and `identify`
#   "magick7" - ImageMagick 7: `magick` and `magick identify`
flavor = "auto"

# Executables for the legacy flavor (names on PATH or absolute paths).
convert_program = "convert"
identify_program = "identify"

# Executable for the magick7 flavor.
magick_program = "magick"

# Seconds a single invocation may run before it is killed.
# 0 waits indefinitely.
timeout_secs = 60
"##
}
