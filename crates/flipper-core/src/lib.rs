//! Flipper Core - fetch remote images, mirror them, upload the result.
//!
//! A batch lists the identifiers a host offers, then runs one worker per
//! identifier over a single shared HTTP client:
//!
//! ```text
//! GET {base} → ids → [GET {base}{id} → mirror → POST {base}] × N → BatchReport
//! ```
//!
//! Individual failures become per-image outcomes and never abort the batch.
//!
//! # Usage
//!
//! ```rust,ignore
//! use flipper_core::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> flipper_core::Result<()> {
//!     let config = Config::load()?;
//!     let report = Orchestrator::new(config).run().await?;
//!     println!("{} of {} uploaded", report.succeeded(), report.total());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod transport;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, FlipperError, ListingError, Result, TransformError, TransportError};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{list_images, mirror, Listing, Orchestrator, Worker};
pub use transport::{HttpClient, Transport};
pub use types::{
    BatchReport, BatchSummary, FetchResult, ImageId, ImageOutcome, OutcomeKind, PipelineOutcome,
    UploadResult,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
