//! Core data types for the Flipper pipeline.
//!
//! These types describe what flows between the lister, the workers and the
//! orchestrator, and what ends up in the batch report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque name of one remote image, appended verbatim to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fetch URL for this image under `base_url` (which ends with `/`).
    pub fn url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.0)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Response to a GET.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
    /// Content-Length header, if the server sent one
    pub content_length: Option<u64>,
}

/// Response to a POST.
#[derive(Debug, Clone, Copy)]
pub struct UploadResult {
    /// HTTP status code
    pub status: u16,
}

/// Terminal classification of one identifier's processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Fetched, mirrored and uploaded
    Success { upload_status: u16 },
    /// The GET failed (non-200 status or transport error)
    FetchFailed { reason: String },
    /// The fetched bytes could not be transformed
    DecodeFailed { reason: String },
    /// The POST failed (transport error or server error)
    UploadFailed { reason: String },
}

/// Outcome variant without its payload, for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    FetchFailed,
    DecodeFailed,
    UploadFailed,
}

impl PipelineOutcome {
    pub fn fetch_failed(reason: impl fmt::Display) -> Self {
        Self::FetchFailed {
            reason: reason.to_string(),
        }
    }

    pub fn decode_failed(reason: impl fmt::Display) -> Self {
        Self::DecodeFailed {
            reason: reason.to_string(),
        }
    }

    pub fn upload_failed(reason: impl fmt::Display) -> Self {
        Self::UploadFailed {
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success { .. } => OutcomeKind::Success,
            Self::FetchFailed { .. } => OutcomeKind::FetchFailed,
            Self::DecodeFailed { .. } => OutcomeKind::DecodeFailed,
            Self::UploadFailed { .. } => OutcomeKind::UploadFailed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure reason, `None` on success.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::FetchFailed { reason }
            | Self::DecodeFailed { reason }
            | Self::UploadFailed { reason } => Some(reason),
        }
    }
}

/// The outcome for one identifier plus how it got there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageOutcome {
    /// The identifier this outcome belongs to
    pub id: ImageId,

    #[serde(flatten)]
    pub outcome: PipelineOutcome,

    /// Wall-clock time spent on this identifier
    pub elapsed_ms: u64,

    /// HTTP requests issued for this identifier, retries included
    pub attempts: u32,
}

/// Result of one batch: every outcome plus wall-clock duration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// One entry per submitted identifier, in submission order
    pub outcomes: Vec<ImageOutcome>,

    /// Wall-clock duration of the whole batch
    pub duration_ms: u64,
}

/// Aggregate counts over a [`BatchReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub fetch_failed: usize,
    pub decode_failed: usize,
    pub upload_failed: usize,
    pub duration_ms: u64,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome.kind() == kind)
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.count(OutcomeKind::Success)
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Outcome recorded for `id`, if it was part of this batch.
    pub fn outcome_for(&self, id: &str) -> Option<&PipelineOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.id.as_str() == id)
            .map(|o| &o.outcome)
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            total: self.total(),
            succeeded: self.succeeded(),
            fetch_failed: self.count(OutcomeKind::FetchFailed),
            decode_failed: self.count(OutcomeKind::DecodeFailed),
            upload_failed: self.count(OutcomeKind::UploadFailed),
            duration_ms: self.duration_ms,
        }
    }
}
