//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `delaylight.toml` in the working directory unless another path
//! is given. Every field has a default so the file is optional. Environment
//! variables take precedence over file values, and the command line over
//! both.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use delaylight_domain::id::DeviceNum;
use delaylight_domain::variant::PluginVariant;

/// Default config file name.
pub const DEFAULT_PATH: &str = "delaylight.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where device state is persisted.
    pub state: StateConfig,
    /// Host directory export.
    pub host: HostConfig,
    /// Which plugin device the panel edits.
    pub panel: PanelSettings,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// State file configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// JSON file holding device state variables.
    pub path: PathBuf,
}

/// Host snapshot configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// JSON export of the host's devices, rooms and scenes.
    pub snapshot: PathBuf,
}

/// Plugin device selection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    /// Device number of the plugin instance. Must be set.
    pub device: u32,
    /// Plugin variant the device runs.
    pub variant: PluginVariant,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present), apply environment
    /// overrides, then the command-line device override.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration names no device.
    pub fn load(path: &Path, device: Option<u32>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        if let Some(device) = device {
            config.panel.device = device;
        }
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("DELAYLIGHT_STATE") {
            self.state.path = val.into();
        }
        if let Some(val) = var("DELAYLIGHT_SNAPSHOT") {
            self.host.snapshot = val.into();
        }
        if let Some(val) = var("DELAYLIGHT_DEVICE") {
            if let Ok(device) = val.trim().parse() {
                self.panel.device = device;
            }
        }
        if let Some(val) = var("DELAYLIGHT_VARIANT") {
            self.panel.variant = val
                .parse()
                .map_err(|err| ConfigError::Validation(format!("DELAYLIGHT_VARIANT: {err}")))?;
        }
        if let Some(val) = var("DELAYLIGHT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.panel.device == 0 {
            return Err(ConfigError::Validation(
                "panel.device must be set to the plugin's device number".to_string(),
            ));
        }
        Ok(())
    }

    /// The plugin device the panel edits.
    #[must_use]
    pub fn device(&self) -> DeviceNum {
        DeviceNum::new(self.panel.device)
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("delaylight-state.json"),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("delaylight-host.json"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "delaylight_panel=info,delaylight_app=info,delaylight_adapter_json_file=info"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
