//! HTTP transport backed by a pooled `reqwest::Client`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use super::client::Transport;
use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::types::{FetchResult, UploadResult};

/// Pooled HTTP client shared by every worker in a batch.
///
/// `reqwest::Client` keeps its connection pool behind an `Arc` and does its
/// own locking, so one instance serves all concurrent requests.
pub struct HttpClient {
    client: reqwest::Client,
    max_body_bytes: Option<u64>,
}

impl HttpClient {
    /// Build a client with the configured timeouts and pool size.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self {
            client,
            max_body_bytes: None,
        })
    }

    /// Refuse GET bodies larger than `limit` bytes.
    ///
    /// A declared `Content-Length` over the limit is rejected before any of
    /// the body is read; otherwise reading stops as soon as the limit is passed.
    pub fn with_body_limit(mut self, limit: u64) -> Self {
        self.max_body_bytes = Some(limit);
        self
    }

    async fn read_body(
        &self,
        url: &str,
        mut resp: reqwest::Response,
    ) -> Result<Vec<u8>, TransportError> {
        let Some(limit) = self.max_body_bytes else {
            let body = resp.bytes().await.map_err(|e| classify(url, e))?;
            return Ok(body.to_vec());
        };
        let too_large = |size: u64| TransportError::BodyTooLarge {
            url: url.to_string(),
            size,
            limit,
        };

        if let Some(declared) = resp.content_length() {
            if declared > limit {
                return Err(too_large(declared));
            }
        }

        let mut body = Vec::with_capacity(resp.content_length().unwrap_or(0) as usize);
        while let Some(chunk) = resp.chunk().await.map_err(|e| classify(url, e))? {
            let size = (body.len() + chunk.len()) as u64;
            if size > limit {
                return Err(too_large(size));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// Map a `reqwest` failure onto the transport error kinds.
fn classify(url: &str, error: reqwest::Error) -> TransportError {
    if let Some(status) = error.status() {
        return TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        };
    }
    if error.is_timeout() || error.is_connect() || error.is_request() {
        return TransportError::Network {
            url: url.to_string(),
            message: error.to_string(),
            timed_out: error.is_timeout(),
        };
    }
    TransportError::Protocol {
        url: url.to_string(),
        message: error.to_string(),
    }
}

fn check_status(url: &str, status: reqwest::StatusCode) -> Result<(), TransportError> {
    if status.is_client_error() || status.is_server_error() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &str) -> Result<FetchResult, TransportError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = resp.status();
        let content_length = resp.content_length();
        tracing::debug!(
            "GET {url} -> {} (content-length {:?})",
            status.as_u16(),
            content_length
        );
        check_status(url, status)?;

        let body = self.read_body(url, resp).await?;
        Ok(FetchResult {
            status: status.as_u16(),
            body,
            content_length,
        })
    }

    async fn post(&self, url: &str, body: Vec<u8>) -> Result<UploadResult, TransportError> {
        let size = body.len();
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = resp.status();
        tracing::debug!("POST {url} ({size} bytes) -> {}", status.as_u16());
        check_status(url, status)?;

        Ok(UploadResult {
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Read one HTTP/1.1 request (headers + Content-Length body).
    async fn read_request(stream: &mut TcpStream) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return buf;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let body_len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    return buf;
                }
            }
        }
    }

    /// Serve a single canned response; yields the raw request bytes.
    async fn serve_once(status_line: &str, body: &[u8]) -> (String, JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .into_bytes();
        response.extend_from_slice(body);

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_request(&mut stream).await;
            stream.write_all(&response).await.unwrap();
            stream.shutdown().await.ok();
            request
        });
        (format!("http://{addr}/images/"), handle)
    }

    /// Send response headers and `body`, then hold the connection open.
    async fn serve_and_stall(head: &str, body: &[u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mut response = format!("HTTP/1.1 200 OK\r\n{head}\r\n\r\n").into_bytes();
        response.extend_from_slice(body);

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            stream.write_all(&response).await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(stream);
        });
        format!("http://{addr}/images/")
    }

    fn fast_config() -> TransportConfig {
        TransportConfig {
            connect_timeout_ms: 1_000,
            request_timeout_ms: 2_000,
            ..TransportConfig::default()
        }
    }

    #[tokio::test]
    async fn test_get_reads_body_and_length() {
        let (base, server) = serve_once("200 OK", b"a.png b.png").await;
        let client = HttpClient::new(&fast_config()).unwrap();

        let result = client.get(&base).await.unwrap();
        assert_eq!(result.status, 200);
        assert_eq!(result.body, b"a.png b.png");
        assert_eq!(result.content_length, Some(11));

        let request = String::from_utf8(server.await.unwrap()).unwrap();
        assert!(request.starts_with("GET /images/ HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_get_404_is_status_error() {
        let (base, _server) = serve_once("404 Not Found", b"").await;
        let client = HttpClient::new(&fast_config()).unwrap();

        let err = client.get(&format!("{base}missing.png")).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_post_sends_raw_body() {
        let (base, server) = serve_once("201 Created", b"").await;
        let client = HttpClient::new(&fast_config()).unwrap();

        let result = client.post(&base, vec![1, 2, 3, 4]).await.unwrap();
        assert_eq!(result.status, 201);

        let request = server.await.unwrap();
        let text = String::from_utf8_lossy(&request).to_lowercase();
        assert!(text.starts_with("post /images/ http/1.1"));
        assert!(text.contains("content-type: application/octet-stream"));
        assert!(request.ends_with(&[1, 2, 3, 4]));
    }

    #[tokio::test]
    async fn test_post_server_error_is_status_error() {
        let (base, _server) = serve_once("500 Internal Server Error", b"boom").await;
        let client = HttpClient::new(&fast_config()).unwrap();

        let err = client.post(&base, vec![0]).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpClient::new(&fast_config()).unwrap();
        let err = client.get(&format!("http://{addr}/")).await.unwrap_err();
        assert!(
            matches!(err, TransportError::Network { timed_out: false, .. }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_unresponsive_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            // Hold the connection open without answering
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(stream);
        });

        let config = TransportConfig {
            request_timeout_ms: 200,
            ..fast_config()
        };
        let client = HttpClient::new(&config).unwrap();
        let err = client
            .post(&format!("http://{addr}/"), vec![0; 16])
            .await
            .unwrap_err();
        assert!(
            matches!(err, TransportError::Network { timed_out: true, .. }),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_declared_oversized_body_rejected_before_reading() {
        // Only 16 of the announced 10 MB ever arrive; waiting for the rest
        // would run into the request timeout instead.
        let base = serve_and_stall("Content-Length: 10000000", &[0; 16]).await;
        let client = HttpClient::new(&fast_config()).unwrap().with_body_limit(1024);

        let err = client.get(&format!("{base}big.png")).await.unwrap_err();
        assert_eq!(
            err,
            TransportError::BodyTooLarge {
                url: format!("{base}big.png"),
                size: 10_000_000,
                limit: 1024,
            }
        );
    }

    #[tokio::test]
    async fn test_chunked_body_stops_at_limit() {
        // Two 1 KiB chunks and no terminating chunk
        let chunk = format!("400\r\n{}\r\n", "x".repeat(1024));
        let body = chunk.repeat(2);
        let base = serve_and_stall("Transfer-Encoding: chunked", body.as_bytes()).await;
        let client = HttpClient::new(&fast_config()).unwrap().with_body_limit(1500);

        let err = client.get(&base).await.unwrap_err();
        assert!(
            matches!(err, TransportError::BodyTooLarge { size, limit: 1500, .. } if size > 1500),
            "got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_body_within_limit_is_read() {
        let (base, _server) = serve_once("200 OK", b"small").await;
        let client = HttpClient::new(&fast_config()).unwrap().with_body_limit(5);

        let result = client.get(&base).await.unwrap();
        assert_eq!(result.body, b"small");
    }
}
