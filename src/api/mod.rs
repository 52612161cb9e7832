//! Status HTTP API
//!
//! Republishes upstream commit status as a small JSON contract.
//!
//! ## Endpoints
//!
//! - `GET /status?owner=<owner>&repo=<repo>` - Build status of the default branch
//! - `GET /health` - Health check (always returns 200 if running)
//! - `GET /states` - The state → symbol / code table
//! - `GET /metrics` - Prometheus request counters

mod metrics;
mod server;
mod state;

pub use server::{StatusQuery, create_router, start_api_server};
pub use state::{ApiState, HealthResponse, StatsSnapshot};
