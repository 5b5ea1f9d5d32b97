//! Retry utilities for transient transport failures.
//!
//! Provides classification of retryable errors and exponential backoff.

use crate::error::TransportError;
use std::time::Duration;

/// Determine whether a transport error is worth retrying.
///
/// Retryable errors: network failures (timeouts, refused or reset
/// connections), rate limits (429), server errors (5xx).
/// Non-retryable: other 4xx, malformed or oversized responses, client setup.
pub fn is_retryable(error: &TransportError) -> bool {
    match error {
        TransportError::Network { .. } => true,
        TransportError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
        TransportError::Protocol { .. }
        | TransportError::BodyTooLarge { .. }
        | TransportError::Client(_) => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

/// Run `op` until it succeeds, fails with a non-retryable error, or
/// `retry_attempts` retries are used up.
///
/// Returns the final result and the number of attempts made.
pub async fn with_retry<T, F, Fut>(
    retry_attempts: u32,
    retry_delay_ms: u64,
    label: &str,
    mut op: F,
) -> (Result<T, TransportError>, u32)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, TransportError>>,
{
    let mut attempt = 0;
    loop {
        let result = op().await;
        attempt += 1;
        match result {
            Err(e) if attempt <= retry_attempts && is_retryable(&e) => {
                let delay = backoff_duration(attempt - 1, retry_delay_ms);
                tracing::debug!("Retry {attempt}/{retry_attempts} for {label} after {delay:?}: {e}");
                tokio::time::sleep(delay).await;
            }
            other => return (other, attempt),
        }
    }
}
