//! Error types for the Flipper pipeline.
//!
//! Errors are split by scope: batch-scoped failures (configuration, listing)
//! propagate to the caller, while transport and transform errors are folded
//! into a per-image [`PipelineOutcome`](crate::types::PipelineOutcome) by the
//! worker and never cross task boundaries.

use thiserror::Error;

/// Top-level error type for Flipper operations.
#[derive(Error, Debug)]
pub enum FlipperError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The listing endpoint answered with a non-2xx status
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    /// Transport setup errors (client construction)
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by a [`Transport`](crate::transport::Transport).
///
/// The three request-level variants are the kinds callers branch on:
/// network trouble, a malformed exchange, or a server-reported failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Timeout, refused connection, reset, DNS failure
    #[error("Network error for {url}: {message}")]
    Network {
        url: String,
        message: String,
        timed_out: bool,
    },

    /// The server answered but the exchange could not be completed
    #[error("Protocol error for {url}: {message}")]
    Protocol { url: String, message: String },

    /// The server reported a failure (status >= 400)
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body exceeded the configured size limit
    #[error("Response from {url} too large: {size} bytes > {limit} bytes")]
    BodyTooLarge { url: String, size: u64, limit: u64 },

    /// The underlying client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl TransportError {
    /// HTTP status code, when the server got far enough to send one.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The listing endpoint rejected the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("Listing request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl ListingError {
    pub fn status(&self) -> u16 {
        match self {
            ListingError::Status { status, .. } => *status,
        }
    }
}

/// Image transform errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// The buffer is not a decodable image
    #[error("Decode error: {0}")]
    Decode(String),

    /// The encoding could not be identified
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Image dimensions exceed limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Re-encoding the mirrored image failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// The transform did not finish in time
    #[error("Transform timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Convenience type alias for Flipper results.
pub type Result<T> = std::result::Result<T, FlipperError>;
