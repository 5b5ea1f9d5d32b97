//! Transport layer: the shared client workers use to reach the remote host.
//!
//! - **client**: the `Transport` trait
//! - **http**: `reqwest`-backed implementation with connection pooling
//! - **retry**: transient-error classification and backoff

pub mod client;
pub mod http;
pub mod retry;

pub use client::Transport;
pub use http::HttpClient;
