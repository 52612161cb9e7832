//! Gitea HTTP API Client
//!
//! Typed access to the two commit-status endpoints this service relies on.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use super::types::{CombinedStatus, Repository};

/// Errors that can occur when talking to the Gitea API
#[derive(Debug, Error)]
pub enum GiteaError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("upstream responded {} - {}", .status.as_u16(), .body)]
    Http { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("URL cannot be used as an API base: {0}")]
    InvalidBaseUrl(String),

    #[error("token contains characters not allowed in a header")]
    InvalidToken,
}

impl GiteaError {
    /// Upstream HTTP status, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            GiteaError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for Gitea API operations
pub type GiteaResult<T> = Result<T, GiteaError>;

/// Client for a Gitea server's commit-status API
///
/// Cheap to clone; clones share the same transport.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use status_relay::client::{GiteaClient, HttpTransport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = Arc::new(HttpTransport::new(Duration::from_secs(10))?);
/// let client = GiteaClient::new("https://git.example.com", "secret", transport)?;
/// let branch = client.default_branch("acme", "widget").await?;
/// let status = client.commit_status("acme", "widget", &branch).await?;
/// println!("{branch}: {}", status.state);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GiteaClient {
    /// Base URL of the Gitea server (e.g., https://git.example.com)
    base_url: Url,
    /// Pre-rendered `token <credential>` header value
    authorization: HeaderValue,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for GiteaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GiteaClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl GiteaClient {
    /// Create a client for `base_url`, authenticating with `token`
    pub fn new(base_url: &str, token: &str, transport: Arc<dyn Transport>) -> GiteaResult<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(GiteaError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut authorization =
            HeaderValue::from_str(&format!("token {token}")).map_err(|_| GiteaError::InvalidToken)?;
        authorization.set_sensitive(true);

        Ok(Self {
            base_url,
            authorization,
            transport,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a repository's default branch
    ///
    /// Endpoint: GET /api/v1/repos/{owner}/{repo}
    pub async fn default_branch(&self, owner: &str, repo: &str) -> GiteaResult<String> {
        let url = self.endpoint(&[owner, repo], &[])?;
        let response = self.get(url).await?;

        if response.status != StatusCode::OK {
            return Err(GiteaError::Http {
                status: response.status,
                body: response.text(),
            });
        }

        let repository: Repository = decode(&response)?;
        Ok(repository.default_branch)
    }

    /// Get the combined commit status of a branch
    ///
    /// Endpoint: GET /api/v1/repos/{owner}/{repo}/commits/{branch}/status
    ///
    /// A 404 means no status was ever reported and yields the `unknown` state.
    pub async fn commit_status(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> GiteaResult<CombinedStatus> {
        let url = self.endpoint(&[owner, repo, "commits"], &[branch, "status"])?;
        let response = self.get(url).await?;

        match response.status {
            StatusCode::NOT_FOUND => {
                debug!(owner, repo, branch, "No commit status reported");
                Ok(CombinedStatus::unknown())
            }
            StatusCode::OK => decode(&response),
            status => Err(GiteaError::Http {
                status,
                body: response.text(),
            }),
        }
    }

    /// Build `{base}/api/v1/repos/...`
    ///
    /// `segments` are encoded as single path segments. `refs` may contain
    /// `/`, which is kept as a path separator so branch names like
    /// `feature/x` reach the server unescaped.
    fn endpoint(&self, segments: &[&str], refs: &[&str]) -> GiteaResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| GiteaError::InvalidBaseUrl(self.base_url.to_string()))?;
            path.pop_if_empty().extend(["api", "v1", "repos"]);
            path.extend(segments);
            for r in refs {
                path.extend(r.split('/'));
            }
        }
        Ok(url)
    }

    async fn get(&self, url: Url) -> GiteaResult<TransportResponse> {
        debug!(url = %url, "GET");

        let mut request = TransportRequest::get(url);
        request
            .headers
            .insert(AUTHORIZATION, self.authorization.clone());

        let response = self.transport.send(request).await?;
        debug!(status = response.status.as_u16(), bytes = response.body.len(), "Upstream responded");
        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(response: &TransportResponse) -> GiteaResult<T> {
    Ok(serde_json::from_slice(&response.body)?)
}
