//! Fetch the list of image identifiers from the host.

use crate::error::{ListingError, TransportError};
use crate::transport::Transport;
use crate::types::ImageId;

/// Identifiers returned by the listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    /// Identifiers in server order
    pub ids: Vec<ImageId>,
    /// Set when the listing request failed below the HTTP status level
    pub warning: Option<String>,
}

impl Listing {
    /// True when the empty result comes from a transport failure.
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

/// Split a listing body into identifiers, one per whitespace-separated token.
pub fn parse_listing(body: &str) -> Vec<ImageId> {
    body.split_whitespace().map(ImageId::from).collect()
}

/// `GET {base_url}` and parse the identifiers it returns.
///
/// Only a non-2xx answer is a [`ListingError`]. Every other transport
/// failure is non-fatal and produces an empty, degraded listing with a
/// warning: network errors (unreachable host, timeout) as well as protocol
/// errors (a response that can't be read) and oversized bodies.
pub async fn list_images<T>(transport: &T, base_url: &str) -> Result<Listing, ListingError>
where
    T: Transport + ?Sized,
{
    let result = match transport.get(base_url).await {
        Ok(result) => result,
        Err(TransportError::Status { url, status }) => {
            return Err(ListingError::Status { url, status })
        }
        Err(e) => {
            tracing::warn!("Listing request failed, continuing with an empty batch: {e}");
            return Ok(Listing {
                ids: Vec::new(),
                warning: Some(e.to_string()),
            });
        }
    };

    if !(200..300).contains(&result.status) {
        return Err(ListingError::Status {
            url: base_url.to_string(),
            status: result.status,
        });
    }

    let ids = parse_listing(&String::from_utf8_lossy(&result.body));
    tracing::info!("Listed {} image(s) from {base_url}", ids.len());
    Ok(Listing { ids, warning: None })
}
