//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.host.base_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "host.base_url '{}' is not a valid URL: {e}",
                self.host.base_url
            ))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::ValidationError(format!(
                "host.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.transport.connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "transport.connect_timeout_ms must be > 0".into(),
            ));
        }
        if self.transport.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "transport.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.pipeline.max_in_flight == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_in_flight must be > 0".into(),
            ));
        }
        if self.limits.max_download_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_download_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if self.limits.transform_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.transform_timeout_ms must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"json\" or \"jsonl\", got '{}'",
                self.output.format
            )));
        }
        Ok(())
    }
}
