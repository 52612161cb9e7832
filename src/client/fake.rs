//! Scripted transport (testing only)
//!
//! A deterministic [`Transport`] that never touches the network. Responses
//! are looked up by exact URL, or computed by a responder closure, and every
//! request is recorded for later assertions.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;

use super::transport::{Transport, TransportError, TransportRequest, TransportResponse};

type Responder =
    dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync;

/// In-memory transport returning canned responses
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, Result<TransportResponse, TransportError>>>,
    responder: Option<Arc<Responder>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("routes", &self.routes.lock().len())
            .field("responder", &self.responder.is_some())
            .field("requests", &self.requests.lock().len())
            .finish()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute every response with `f` instead of the URL table
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&TransportRequest) -> Result<TransportResponse, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Some(Arc::new(f)),
            ..Self::default()
        }
    }

    /// Answer `url` with `status` and `body`
    pub fn respond(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let response = TransportResponse::new(status, body.into());
        self.routes.lock().insert(url.into(), Ok(response));
        self
    }

    /// Fail requests to `url` with `error`
    pub fn fail(self, url: impl Into<String>, error: TransportError) -> Self {
        self.routes.lock().insert(url.into(), Err(error));
        self
    }

    /// All requests seen so far, in order
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests seen so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().push(request.clone());

        if let Some(responder) = &self.responder {
            return responder(&request);
        }

        self.routes
            .lock()
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Connect(format!(
                    "no scripted response for {}",
                    request.url
                )))
            })
    }
}
