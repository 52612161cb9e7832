//! Prometheus metrics
//!
//! Exposes request counters in Prometheus text format at `/metrics`.
//!
//! ## Metrics Exposed
//!
//! - `status_relay_info` - Build information
//! - `status_relay_uptime_seconds` - Time since the server started
//! - `status_relay_requests_total` - `/status` requests served
//! - `status_relay_errors_total` - `/status` responses carrying an error
//! - `status_relay_responses_total{code}` - `/status` responses by HTTP code
//! - `status_relay_states_total{state}` - Resolved commit states

use axum::{extract::State, http::StatusCode, http::header, response::IntoResponse};
use std::fmt::Write;

use super::state::{ApiState, StatsSnapshot};

const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Generate Prometheus-format metrics
pub async fn metrics_handler(State(state): State<ApiState>) -> impl IntoResponse {
    match render(&state.snapshot()) {
        Ok(output) => (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], output),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, CONTENT_TYPE)],
            String::new(),
        ),
    }
}

fn render(snapshot: &StatsSnapshot) -> Result<String, std::fmt::Error> {
    let mut output = String::new();

    writeln!(output, "# HELP status_relay_info Build information")?;
    writeln!(output, "# TYPE status_relay_info gauge")?;
    writeln!(
        output,
        "status_relay_info{{version=\"{}\"}} 1",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(output)?;

    writeln!(
        output,
        "# HELP status_relay_uptime_seconds Time elapsed since start"
    )?;
    writeln!(output, "# TYPE status_relay_uptime_seconds gauge")?;
    writeln!(
        output,
        "status_relay_uptime_seconds {}",
        snapshot.uptime_ms as f64 / 1000.0
    )?;
    writeln!(output)?;

    writeln!(
        output,
        "# HELP status_relay_requests_total Status requests served"
    )?;
    writeln!(output, "# TYPE status_relay_requests_total counter")?;
    writeln!(
        output,
        "status_relay_requests_total {}",
        snapshot.requests_total
    )?;
    writeln!(output)?;

    writeln!(
        output,
        "# HELP status_relay_errors_total Status responses carrying an error"
    )?;
    writeln!(output, "# TYPE status_relay_errors_total counter")?;
    writeln!(output, "status_relay_errors_total {}", snapshot.errors_total)?;

    if !snapshot.responses.is_empty() {
        writeln!(output)?;
        writeln!(
            output,
            "# HELP status_relay_responses_total Status responses by HTTP code"
        )?;
        writeln!(output, "# TYPE status_relay_responses_total counter")?;
        for (code, count) in &snapshot.responses {
            writeln!(
                output,
                "status_relay_responses_total{{code=\"{code}\"}} {count}"
            )?;
        }
    }

    if !snapshot.states.is_empty() {
        writeln!(output)?;
        writeln!(
            output,
            "# HELP status_relay_states_total Resolved commit states"
        )?;
        writeln!(output, "# TYPE status_relay_states_total counter")?;
        for (state, count) in &snapshot.states {
            writeln!(
                output,
                "status_relay_states_total{{state=\"{}\"}} {count}",
                escape_label(state)
            )?;
        }
    }

    Ok(output)
}

/// Escape a label value per the Prometheus text format
fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
