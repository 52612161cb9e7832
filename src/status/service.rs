//! Status resolution
//!
//! Turns an owner/repo pair into a [`BuildStatus`] by resolving the default
//! branch, fetching its combined commit status and mapping the state.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::states;
use crate::client::{GiteaClient, GiteaError};

/// Errors surfaced to callers of `/status`
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Both 'owner' and 'repo' query parameters are required")]
    MissingParameters,

    #[error("Failed to get repository info: {0}")]
    RepositoryInfo(#[source] GiteaError),

    #[error("Failed to get commit status: {0}")]
    CommitStatus(#[source] GiteaError),
}

impl StatusError {
    /// HTTP code answered for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            StatusError::MissingParameters => StatusCode::BAD_REQUEST,
            StatusError::RepositoryInfo(_) | StatusError::CommitStatus(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Response body of `GET /status`
///
/// Fields are filled in as resolution progresses, so an error response
/// carries whatever was known when it failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    pub owner: String,
    pub repository: String,
    pub branch: String,
    pub state: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BuildStatus {
    /// Body carrying only an error message
    pub fn error_only(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    fn failed(mut self, err: &StatusError) -> Self {
        self.error = Some(err.to_string());
        self
    }
}

/// Outcome of one resolution: the HTTP code and the body to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub code: StatusCode,
    pub body: BuildStatus,
}

impl StatusReport {
    /// Whether the body carries an error
    pub fn is_error(&self) -> bool {
        self.body.error.is_some()
    }
}

/// Resolves build status through a [`GiteaClient`]
///
/// Holds no per-request state; one instance serves every request.
#[derive(Debug, Clone)]
pub struct StatusService {
    client: GiteaClient,
}

impl StatusService {
    pub fn new(client: GiteaClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GiteaClient {
        &self.client
    }

    /// Resolve the build status of `owner/repo`'s default branch
    ///
    /// Never fails: errors are reported in the returned body along with a
    /// 400 or 500 code.
    pub async fn resolve(&self, owner: &str, repo: &str) -> StatusReport {
        if owner.is_empty() || repo.is_empty() {
            let err = StatusError::MissingParameters;
            return StatusReport {
                code: err.status_code(),
                body: BuildStatus::default().failed(&err),
            };
        }

        let mut body = BuildStatus {
            owner: owner.to_string(),
            repository: repo.to_string(),
            ..BuildStatus::default()
        };

        let branch = match self.client.default_branch(owner, repo).await {
            Ok(branch) => branch,
            Err(e) => return Self::fail(body, StatusError::RepositoryInfo(e)),
        };
        body.branch = branch;

        let status = match self.client.commit_status(owner, repo, &body.branch).await {
            Ok(status) => status,
            Err(e) => return Self::fail(body, StatusError::CommitStatus(e)),
        };

        let mapped = states::lookup(&status.state);
        body.symbol = mapped.symbol.to_string();
        body.state = status.state;

        info!(
            owner = %body.owner,
            repo = %body.repository,
            branch = %body.branch,
            state = %body.state,
            code = mapped.code.as_u16(),
            "Resolved build status"
        );

        StatusReport {
            code: mapped.code,
            body,
        }
    }

    fn fail(body: BuildStatus, err: StatusError) -> StatusReport {
        warn!(
            owner = %body.owner,
            repo = %body.repository,
            branch = %body.branch,
            error = %err,
            "Status resolution failed"
        );
        StatusReport {
            code: err.status_code(),
            body: body.failed(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportError;
    use crate::client::fake::ScriptedTransport;
    use std::sync::Arc;

    const REPO_URL: &str = "https://git.example.com/api/v1/repos/acme/widget";

    fn status_url(branch: &str) -> String {
        format!("{REPO_URL}/commits/{branch}/status")
    }

    fn service(transport: &Arc<ScriptedTransport>) -> StatusService {
        let client =
            GiteaClient::new("https://git.example.com", "test-token", transport.clone()).unwrap();
        StatusService::new(client)
    }

    #[tokio::test]
    async fn test_missing_parameters() {
        let transport = Arc::new(ScriptedTransport::new());
        let service = service(&transport);

        for (owner, repo) in [("", "widget"), ("acme", ""), ("", "")] {
            let report = service.resolve(owner, repo).await;
            assert_eq!(report.code, StatusCode::BAD_REQUEST);
            assert_eq!(
                report.body,
                BuildStatus::error_only("Both 'owner' and 'repo' query parameters are required")
            );
        }
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_repository_info_failure() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            REPO_URL,
            404,
            r#"{"message":"Repository not found"}"#,
        ));

        let report = service(&transport).resolve("acme", "widget").await;
        assert_eq!(report.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(report.body.owner, "acme");
        assert_eq!(report.body.repository, "widget");
        assert!(report.body.branch.is_empty());
        assert!(report.body.state.is_empty());
        assert!(report.body.symbol.is_empty());

        let error = report.body.error.unwrap();
        assert!(error.starts_with("Failed to get repository info: "));
        assert!(error.contains("404"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_commit_status_failure_keeps_branch() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(REPO_URL, 200, r#"{"default_branch":"main"}"#)
                .fail(
                    status_url("main"),
                    TransportError::Timeout("deadline exceeded".into()),
                ),
        );

        let report = service(&transport).resolve("acme", "widget").await;
        assert_eq!(report.code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(report.body.branch, "main");
        assert!(report.body.state.is_empty());

        let error = report.body.error.unwrap();
        assert!(error.starts_with("Failed to get commit status: "));
        assert!(error.contains("deadline exceeded"));
    }

    #[tokio::test]
    async fn test_no_status_is_unknown() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(REPO_URL, 200, r#"{"default_branch":"main"}"#)
                .respond(status_url("main"), 404, ""),
        );

        let report = service(&transport).resolve("acme", "widget").await;
        assert_eq!(report.code, StatusCode::NO_CONTENT);
        assert_eq!(
            report.body,
            BuildStatus {
                owner: "acme".into(),
                repository: "widget".into(),
                branch: "main".into(),
                state: "unknown".into(),
                symbol: "○".into(),
                error: None,
            }
        );
    }

    #[tokio::test]
    async fn test_success() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(REPO_URL, 200, r#"{"default_branch":"main"}"#)
                .respond(
                    status_url("main"),
                    200,
                    r#"{"state":"success","statuses":[],"total_count":0}"#,
                ),
        );

        let report = service(&transport).resolve("acme", "widget").await;
        assert_eq!(report.code, StatusCode::OK);
        assert!(!report.is_error());
        assert_eq!(report.body.symbol, "✓");
        assert_eq!(transport.call_count(), 2);

        let urls: Vec<_> = transport
            .requests()
            .into_iter()
            .map(|r| r.url.to_string())
            .collect();
        assert_eq!(urls, [REPO_URL.to_string(), status_url("main")]);
    }

    #[tokio::test]
    async fn test_unrecognized_state_passes_through() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(REPO_URL, 200, r#"{"default_branch":"trunk"}"#)
                .respond(status_url("trunk"), 200, r#"{"state":"skipped"}"#),
        );

        let report = service(&transport).resolve("acme", "widget").await;
        assert_eq!(report.code, StatusCode::OK);
        assert_eq!(report.body.state, "skipped");
        assert_eq!(report.body.symbol, "?");
    }

    #[tokio::test]
    async fn test_missing_state_maps_to_fallback() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(REPO_URL, 200, r#"{"default_branch":"main"}"#)
                .respond(status_url("main"), 200, r#"{"statuses":[],"total_count":-1}"#),
        );

        let report = service(&transport).resolve("acme", "widget").await;
        assert_eq!(report.code, StatusCode::OK);
        assert!(!report.is_error());
        assert_eq!(report.body.state, "");
        assert_eq!(report.body.symbol, "?");
    }

    #[tokio::test]
    async fn test_missing_default_branch_is_empty() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(REPO_URL, 200, r#"{"name":"widget"}"#)
                .respond(format!("{REPO_URL}/commits//status"), 404, ""),
        );

        let report = service(&transport).resolve("acme", "widget").await;
        assert_eq!(report.body.branch, "");
        assert_eq!(report.body.state, "unknown");
        assert_eq!(report.code, StatusCode::NO_CONTENT);
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_error_body_serialization() {
        let json = serde_json::to_value(BuildStatus::error_only("boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "owner": "",
                "repository": "",
                "branch": "",
                "state": "",
                "symbol": "",
                "error": "boom"
            })
        );
    }

    #[test]
    fn test_success_body_omits_error() {
        let body = BuildStatus {
            owner: "acme".into(),
            state: "success".into(),
            ..BuildStatus::default()
        };
        let json = serde_json::to_value(body).unwrap();
        assert!(json.get("error").is_none());
    }
}
