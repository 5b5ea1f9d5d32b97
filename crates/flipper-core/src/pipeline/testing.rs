//! Scripted in-memory transport for pipeline tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::TransportError;
use crate::transport::Transport;
use crate::types::{FetchResult, UploadResult};

#[derive(Debug, Clone, Copy)]
enum Failure {
    Network,
    Timeout,
    Protocol,
}

/// One scripted response.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    status: u16,
    body: Vec<u8>,
    failure: Option<Failure>,
    delay: Option<Duration>,
}

impl Reply {
    pub(crate) fn ok(body: &[u8]) -> Self {
        Self {
            status: 200,
            body: body.to_vec(),
            failure: None,
            delay: None,
        }
    }

    pub(crate) fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::ok(b"")
        }
    }

    pub(crate) fn network_error() -> Self {
        Self {
            failure: Some(Failure::Network),
            ..Self::ok(b"")
        }
    }

    pub(crate) fn timeout() -> Self {
        Self {
            failure: Some(Failure::Timeout),
            ..Self::ok(b"")
        }
    }

    pub(crate) fn protocol_error() -> Self {
        Self {
            failure: Some(Failure::Protocol),
            ..Self::ok(b"")
        }
    }

    pub(crate) fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn outcome(&self, url: &str) -> Result<u16, TransportError> {
        match self.failure {
            Some(Failure::Network) => Err(TransportError::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
                timed_out: false,
            }),
            Some(Failure::Timeout) => Err(TransportError::Network {
                url: url.to_string(),
                message: "operation timed out".to_string(),
                timed_out: true,
            }),
            Some(Failure::Protocol) => Err(TransportError::Protocol {
                url: url.to_string(),
                message: "malformed response".to_string(),
            }),
            None if self.status >= 400 => Err(TransportError::Status {
                url: url.to_string(),
                status: self.status,
            }),
            None => Ok(self.status),
        }
    }
}

/// Replies are consumed in order per URL; the last one repeats.
#[derive(Default)]
struct Script {
    replies: Vec<Reply>,
    next: usize,
}

impl Script {
    fn next(&mut self) -> Option<Reply> {
        let idx = self.next.min(self.replies.len().checked_sub(1)?);
        self.next += 1;
        Some(self.replies[idx].clone())
    }
}

/// A configurable mock transport.
///
/// Unscripted GETs answer 404, unscripted POSTs answer 200.
#[derive(Default)]
pub(crate) struct MockTransport {
    gets: Mutex<HashMap<String, Script>>,
    posts: Mutex<Script>,
    uploaded: Mutex<Vec<Vec<u8>>>,
    get_count: AtomicU32,
    post_count: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_get(self, url: &str, reply: Reply) -> Self {
        self.gets
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .replies
            .push(reply);
        self
    }

    pub(crate) fn on_post(self, reply: Reply) -> Self {
        self.posts.lock().unwrap().replies.push(reply);
        self
    }

    pub(crate) fn get_count(&self) -> u32 {
        self.get_count.load(Ordering::SeqCst)
    }

    pub(crate) fn post_count(&self) -> u32 {
        self.post_count.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn uploaded(&self) -> Vec<Vec<u8>> {
        self.uploaded.lock().unwrap().clone()
    }

    async fn respond(&self, reply: &Reply) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> Result<FetchResult, TransportError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .gets
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(Script::next)
            .unwrap_or_else(|| Reply::status(404));
        self.respond(&reply).await;

        let status = reply.outcome(url)?;
        Ok(FetchResult {
            status,
            content_length: Some(reply.body.len() as u64),
            body: reply.body,
        })
    }

    async fn post(&self, url: &str, body: Vec<u8>) -> Result<UploadResult, TransportError> {
        self.post_count.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .posts
            .lock()
            .unwrap()
            .next()
            .unwrap_or_else(|| Reply::status(200));
        self.respond(&reply).await;

        let status = reply.outcome(url)?;
        self.uploaded.lock().unwrap().push(body);
        Ok(UploadResult { status })
    }
}
