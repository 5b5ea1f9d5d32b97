//! Per-identifier unit of work: fetch, mirror, upload.
//!
//! ```text
//! Fetching → Transforming → Uploading → Done
//!     └──────────┴──────────────┴──→ Failed(stage)
//! ```
//!
//! Every failure is caught here and turned into a [`PipelineOutcome`]; no
//! error ever leaves a worker, so one image cannot affect its siblings.

use std::fmt;
use std::time::Instant;

use crate::config::Config;
use crate::transport::retry::with_retry;
use crate::transport::Transport;
use crate::types::{ImageId, ImageOutcome, PipelineOutcome};

use super::transform::Transformer;

/// Where a worker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Transforming,
    Uploading,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetching => "fetch",
            Stage::Transforming => "transform",
            Stage::Uploading => "upload",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Settings every worker in a batch shares.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Base URL ending with `/`
    pub base_url: String,
    /// Retries for transient fetch/upload failures
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds
    pub retry_delay_ms: u64,
    /// Largest accepted image body in bytes
    pub max_download_bytes: u64,
}

impl WorkerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url(),
            retry_attempts: config.pipeline.retry_attempts,
            retry_delay_ms: config.pipeline.retry_delay_ms,
            max_download_bytes: config.limits.max_download_bytes(),
        }
    }
}

/// Runs the fetch → mirror → upload sequence for one identifier at a time.
#[derive(Debug, Clone)]
pub struct Worker {
    options: WorkerOptions,
    transformer: Transformer,
}

impl Worker {
    pub fn new(options: WorkerOptions, transformer: Transformer) -> Self {
        Self {
            options,
            transformer,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            WorkerOptions::from_config(config),
            Transformer::new(config.limits.clone()),
        )
    }

    /// Process `id` using the shared `transport`. Never fails; the returned
    /// outcome records where and why processing stopped.
    pub async fn run<T>(&self, id: ImageId, transport: &T) -> ImageOutcome
    where
        T: Transport + ?Sized,
    {
        let start = Instant::now();
        let mut requests = 0;
        let (stage, outcome) = self.execute(&id, transport, &mut requests).await;

        match &outcome {
            PipelineOutcome::Success { upload_status } => {
                tracing::debug!("{id}: uploaded (HTTP {upload_status}) in {:?}", start.elapsed());
            }
            failed => {
                tracing::warn!(
                    "{id}: {stage} failed: {}",
                    failed.reason().unwrap_or_default()
                );
            }
        }

        ImageOutcome {
            id,
            outcome,
            elapsed_ms: start.elapsed().as_millis() as u64,
            attempts: requests,
        }
    }

    async fn execute<T>(
        &self,
        id: &ImageId,
        transport: &T,
        requests: &mut u32,
    ) -> (Stage, PipelineOutcome)
    where
        T: Transport + ?Sized,
    {
        let opts = &self.options;

        // Fetching
        let url = id.url(&opts.base_url);
        let (fetched, attempts) = with_retry(opts.retry_attempts, opts.retry_delay_ms, &url, || {
            transport.get(&url)
        })
        .await;
        *requests += attempts;

        let fetched = match fetched {
            Ok(fetched) => fetched,
            Err(e) => return (Stage::Fetching, PipelineOutcome::fetch_failed(e)),
        };
        if fetched.status != 200 {
            return (
                Stage::Fetching,
                PipelineOutcome::fetch_failed(format!("HTTP {} from {url}", fetched.status)),
            );
        }
        let size = fetched.body.len() as u64;
        if size > opts.max_download_bytes {
            return (
                Stage::Fetching,
                PipelineOutcome::fetch_failed(format!(
                    "Image too large: {size} bytes > {} bytes",
                    opts.max_download_bytes
                )),
            );
        }
        tracing::trace!("{id}: fetched {size} bytes");

        // Transforming
        let mirrored = match self.transformer.apply(fetched.body).await {
            Ok(mirrored) => mirrored,
            Err(e) => return (Stage::Transforming, PipelineOutcome::decode_failed(e)),
        };
        if mirrored.format_changed() {
            tracing::debug!(
                "{id}: re-encoded {:?} as {:?}",
                mirrored.source_format,
                mirrored.output_format
            );
        }

        // Uploading
        let body = mirrored.bytes;
        let (uploaded, attempts) =
            with_retry(opts.retry_attempts, opts.retry_delay_ms, id.as_str(), || {
                transport.post(&opts.base_url, body.clone())
            })
            .await;
        *requests += attempts;

        match uploaded {
            Ok(result) => (
                Stage::Done,
                PipelineOutcome::Success {
                    upload_status: result.status,
                },
            ),
            Err(e) => (Stage::Uploading, PipelineOutcome::upload_failed(e)),
        }
    }
}
