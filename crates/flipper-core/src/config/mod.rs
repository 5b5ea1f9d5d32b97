//! Configuration management for Flipper.
//!
//! Configuration is loaded from a TOML file with sensible defaults. The file
//! location is `$FLIPPER_CONFIG` when set, otherwise the platform config dir.
//! `FLIPPER_BASE_URL` overrides the host without needing a file at all.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FLIPPER_CONFIG";

/// Environment variable overriding `host.base_url`.
pub const BASE_URL_ENV: &str = "FLIPPER_BASE_URL";

/// Root configuration structure for Flipper.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote host settings
    pub host: HostConfig,

    /// HTTP transport settings
    pub transport: TransportConfig,

    /// Pipeline settings
    pub pipeline: PipelineConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Report output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from `$FLIPPER_CONFIG` or the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.flipper.flipper/config.toml
    /// - Linux: ~/.config/flipper/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\flipper\config\config.toml
    ///
    /// Falls back to ~/.flipper/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "flipper", "flipper")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".flipper").join("config.toml")
            })
    }

    /// Apply overrides from the process environment and re-validate.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.override_base_url(std::env::var(BASE_URL_ENV).ok())
    }

    /// A rejected override leaves the config unchanged.
    fn override_base_url(&mut self, base_url: Option<String>) -> Result<(), ConfigError> {
        let Some(url) = base_url.filter(|u| !u.trim().is_empty()) else {
            return self.validate();
        };
        let mut candidate = self.clone();
        candidate.host.base_url = url.trim().to_string();
        candidate.validate()?;
        tracing::debug!("host.base_url overridden from {BASE_URL_ENV}");
        *self = candidate;
        Ok(())
    }

    /// Base URL normalised to end with `/`, ready for `{base}{id}` concatenation.
    pub fn base_url(&self) -> String {
        let base = self.host.base_url.trim();
        if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
