//! API State management
//!
//! Shared state for the HTTP API: the status service and request counters.

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::status::{StatusReport, StatusService, is_known};

/// Counter label for states outside the known table
pub const OTHER_STATE: &str = "other";

/// Internal mutable counters
#[derive(Debug)]
struct InnerStats {
    started_at: Instant,
    requests_total: u64,
    errors_total: u64,
    /// Responses per HTTP code
    responses: BTreeMap<u16, u64>,
    /// Successful resolutions per commit state, unknown ones under [`OTHER_STATE`]
    states: BTreeMap<String, u64>,
}

/// Shared API state
#[derive(Debug, Clone)]
pub struct ApiState {
    service: Arc<StatusService>,
    stats: Arc<RwLock<InnerStats>>,
}

impl ApiState {
    /// Create new API state around `service`
    pub fn new(service: StatusService) -> Self {
        Self {
            service: Arc::new(service),
            stats: Arc::new(RwLock::new(InnerStats {
                started_at: Instant::now(),
                requests_total: 0,
                errors_total: 0,
                responses: BTreeMap::new(),
                states: BTreeMap::new(),
            })),
        }
    }

    /// The status service
    pub fn service(&self) -> &StatusService {
        &self.service
    }

    /// Record a `/status` response
    pub fn record(&self, report: &StatusReport) {
        let mut stats = self.stats.write();
        stats.requests_total += 1;
        *stats.responses.entry(report.code.as_u16()).or_insert(0) += 1;
        if report.is_error() {
            stats.errors_total += 1;
        } else {
            let state = &report.body.state;
            let label = if is_known(state) { state.as_str() } else { OTHER_STATE };
            *stats.states.entry(label.to_string()).or_insert(0) += 1;
        }
    }

    /// Get a snapshot of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        let stats = self.stats.read();
        StatsSnapshot {
            requests_total: stats.requests_total,
            errors_total: stats.errors_total,
            responses: stats.responses.clone(),
            states: stats.states.clone(),
            uptime_ms: stats.started_at.elapsed().as_millis() as u64,
        }
    }
}

/// Point-in-time copy of the request counters
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub requests_total: u64,
    pub errors_total: u64,
    pub responses: BTreeMap<u16, u64>,
    pub states: BTreeMap<String, u64>,
    pub uptime_ms: u64,
}

/// Health response
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
