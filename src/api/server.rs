//! HTTP Server
//!
//! Axum-based HTTP server providing the status endpoints.

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::metrics::metrics_handler;
use super::state::{ApiState, HealthResponse};
use crate::status::{BuildStatus, StateEntry, known_states};

/// Start the API server on the given address
///
/// Runs until Ctrl-C is received, then drains in-flight requests.
pub async fn start_api_server(
    addr: SocketAddr,
    state: ApiState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    info!(addr = %listener.local_addr()?, "Starting status API server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Status API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Create the API router
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/status",
            get(status_handler)
                .head(method_not_allowed_handler)
                .fallback(method_not_allowed_handler),
        )
        .route("/states", get(states_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Query parameters of `/status`
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusQuery {
    pub owner: Option<String>,
    pub repo: Option<String>,
}

impl StatusQuery {
    /// Parse a raw query string, keeping the first value of a repeated key
    ///
    /// Never fails; malformed pairs decode lossily.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "owner" => &mut parsed.owner,
                "repo" => &mut parsed.repo,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        parsed
    }
}

/// Health check endpoint
///
/// Returns 200 whenever the process is serving, regardless of upstream
/// reachability.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Status endpoint
///
/// Answers with the code derived from the commit state, or 400/500 on error.
async fn status_handler(
    State(state): State<ApiState>,
    RawQuery(raw): RawQuery,
) -> (StatusCode, Json<BuildStatus>) {
    let query = StatusQuery::parse(raw.as_deref().unwrap_or_default());
    let owner = query.owner.unwrap_or_default();
    let repo = query.repo.unwrap_or_default();

    let report = state.service().resolve(&owner, &repo).await;
    state.record(&report);

    (report.code, Json(report.body))
}

/// Any non-GET request to `/status`, HEAD included
async fn method_not_allowed_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(BuildStatus::error_only("Method not allowed")),
    )
}

/// State table endpoint
async fn states_handler() -> Json<Vec<StateEntry>> {
    Json(known_states())
}
