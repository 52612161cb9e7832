//! HTTP transport abstraction
//!
//! Everything the Gitea client sends goes through a [`Transport`]. The
//! production implementation wraps a shared `reqwest::Client`; tests swap in
//! [`ScriptedTransport`](super::fake::ScriptedTransport).

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default upper bound for a single upstream round trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure to obtain any response from the upstream server
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Outbound request descriptor
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl TransportRequest {
    /// Create a GET request with no headers
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
        }
    }
}

/// Fully buffered upstream response
///
/// The body is read to completion by the transport, so the underlying
/// connection is already released once this value exists.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    /// Build a response with the given status and body and no headers
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Send one HTTP request and return its response
///
/// Implementations must be safe to share between concurrently running
/// requests and must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Network-backed transport using reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("status-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// Create a transport around an existing client
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// The client-wide request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_timeout() {
        let transport = HttpTransport::new(Duration::from_secs(3)).unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_response_text_lossy() {
        let response = TransportResponse::new(StatusCode::OK, vec![b'o', b'k', 0xff]);
        assert_eq!(response.text(), "ok\u{fffd}");
    }

    #[test]
    fn test_get_request_has_no_headers() {
        let url = Url::parse("https://git.example.com/api/v1/repos/a/b").unwrap();
        let request = TransportRequest::get(url.clone());
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, url);
        assert!(request.headers.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Reserve a free port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();

        let result = transport.send(TransportRequest::get(url)).await;
        assert!(result.is_err());
    }
}
