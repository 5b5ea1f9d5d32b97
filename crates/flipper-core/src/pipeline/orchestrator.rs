//! Batch orchestration: one shared client, one worker per identifier.
//!
//! Workers are driven as a bounded stream inside a single async scope that
//! borrows the client. The client therefore outlives every worker, and its
//! pooled connections are released when the scope ends, however the
//! individual workers fared. Workers finish in any order, so each outcome
//! carries its submission index and the report is sorted back afterwards.

use futures_util::stream::{self, StreamExt};
use std::time::Instant;

use crate::config::Config;
use crate::error::{ListingError, Result, TransportError};
use crate::transport::{HttpClient, Transport};
use crate::types::{BatchReport, ImageId, ImageOutcome};

use super::listing::list_images;
use super::worker::Worker;

/// Runs batches of identifiers through the fetch → mirror → upload pipeline.
pub struct Orchestrator {
    config: Config,
    worker: Worker,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        let worker = Worker::from_config(&config);
        Self { config, worker }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List the host's images and process all of them with one client.
    ///
    /// Only a rejected listing (non-2xx) is an error; an unreachable host
    /// yields an empty report.
    pub async fn run(&self) -> Result<BatchReport> {
        let client = self.client()?;
        let report = self.list_and_run_with(&client).await?;
        Ok(report)
    }

    /// Process `ids` with a client created for, and dropped after, this batch.
    pub async fn run_batch(
        &self,
        ids: Vec<ImageId>,
    ) -> std::result::Result<BatchReport, TransportError> {
        let client = self.client()?;
        Ok(self.run_with(&client, ids).await)
    }

    fn client(&self) -> std::result::Result<HttpClient, TransportError> {
        let client = HttpClient::new(&self.config.transport)?
            .with_body_limit(self.config.limits.max_download_bytes());
        Ok(client)
    }

    /// List then process, over a caller-provided transport.
    pub async fn list_and_run_with<T>(
        &self,
        transport: &T,
    ) -> std::result::Result<BatchReport, ListingError>
    where
        T: Transport + ?Sized,
    {
        let listing = list_images(transport, &self.config.base_url()).await?;
        Ok(self.run_with(transport, listing.ids).await)
    }

    /// Process `ids` over a caller-provided transport.
    ///
    /// Returns exactly one outcome per identifier, in submission order. At
    /// most `pipeline.max_in_flight` workers run at once, and a freed slot is
    /// refilled right away, so a slow or failing worker never cancels or
    /// delays its siblings.
    pub async fn run_with<T>(&self, transport: &T, ids: Vec<ImageId>) -> BatchReport
    where
        T: Transport + ?Sized,
    {
        let start = Instant::now();
        let total = ids.len();
        let max_in_flight = self.config.pipeline.max_in_flight.max(1);
        tracing::info!("Processing {total} image(s), up to {max_in_flight} in flight");

        let worker = &self.worker;
        let mut indexed: Vec<(usize, ImageOutcome)> = stream::iter(ids.into_iter().enumerate())
            .map(|(index, id)| async move { (index, worker.run(id, transport).await) })
            .buffer_unordered(max_in_flight)
            .collect()
            .await;
        debug_assert_eq!(indexed.len(), total);
        indexed.sort_unstable_by_key(|(index, _)| *index);
        let outcomes = indexed.into_iter().map(|(_, outcome)| outcome).collect();

        let report = BatchReport {
            outcomes,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        let summary = report.summary();
        tracing::info!(
            "Batch finished in {:?}: {} succeeded, {} failed \
             (fetch {}, decode {}, upload {})",
            start.elapsed(),
            summary.succeeded,
            report.failed(),
            summary.fetch_failed,
            summary.decode_failed,
            summary.upload_failed
        );
        report
    }
}
