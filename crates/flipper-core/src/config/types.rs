//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Remote host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Base URL all endpoints are derived from.
    /// Listing: `GET {base_url}`, fetch: `GET {base_url}{id}`, upload: `POST {base_url}`.
    pub base_url: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/images/".to_string(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in milliseconds (applies to every GET and POST)
    pub request_timeout_ms: u64,

    /// Idle pooled connections kept per host
    pub pool_max_idle_per_host: usize,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
            pool_max_idle_per_host: 32,
            user_agent: format!("flipper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Pipeline settings for fan-out and retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max identifiers processed concurrently
    pub max_in_flight: usize,

    /// Max retry attempts for transient fetch/upload failures (0 = no retries)
    pub retry_attempts: u32,

    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 16,
            retry_attempts: 0,
            retry_delay_ms: 500,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum downloaded image size in megabytes
    pub max_download_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode + mirror + encode timeout in milliseconds
    pub transform_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_download_mb: 50,
            max_image_dimension: 10_000,
            transform_timeout_ms: 10_000,
        }
    }
}

impl LimitsConfig {
    /// Download limit in bytes.
    pub fn max_download_bytes(&self) -> u64 {
        self.max_download_mb.saturating_mul(1024 * 1024)
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Report format ("json" or "jsonl")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
