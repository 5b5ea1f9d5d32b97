//! The transport seam workers talk to.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{FetchResult, UploadResult};

/// A reusable connection facility for one remote host.
///
/// Implementations must be safe to call concurrently from many workers
/// without outside locking. Status codes >= 400 are reported as
/// [`TransportError::Status`]; anything below comes back as `Ok` with the
/// status attached so callers can apply their own acceptance rules.
///
/// Uses `async_trait` so the orchestrator can hold `&dyn Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET and read the whole body.
    async fn get(&self, url: &str) -> Result<FetchResult, TransportError>;

    /// POST `body` as the raw request body.
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<UploadResult, TransportError>;
}
