//! State table
//!
//! Maps a Gitea commit state to the symbol shown to users and the HTTP code
//! this service answers with. Lookups are total: states missing from the
//! table get [`UNRECOGNIZED_SYMBOL`] and `200 OK`.

use axum::http::StatusCode;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Serialize;

/// Symbol for any state not in the table, including the empty string
pub const UNRECOGNIZED_SYMBOL: &str = "?";

/// Display mapping for one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDisplay {
    pub symbol: &'static str,
    pub code: StatusCode,
}

const fn display(symbol: &'static str, code: StatusCode) -> StateDisplay {
    StateDisplay { symbol, code }
}

/// Known commit states, in the order they are listed to clients
pub static STATES: Lazy<IndexMap<&'static str, StateDisplay>> = Lazy::new(|| {
    IndexMap::from([
        ("success", display("✓", StatusCode::OK)),
        ("failure", display("✗", StatusCode::EXPECTATION_FAILED)),
        ("error", display("✗", StatusCode::INTERNAL_SERVER_ERROR)),
        ("pending", display("●", StatusCode::ACCEPTED)),
        // successful, but with warnings
        ("warning", display("⚠", StatusCode::OK)),
        ("unknown", display("○", StatusCode::NO_CONTENT)),
    ])
});

const UNRECOGNIZED: StateDisplay = display(UNRECOGNIZED_SYMBOL, StatusCode::OK);

/// Display mapping for `state`; case-sensitive
pub fn lookup(state: &str) -> StateDisplay {
    STATES.get(state).copied().unwrap_or(UNRECOGNIZED)
}

/// Whether `state` has its own row in the table
pub fn is_known(state: &str) -> bool {
    STATES.contains_key(state)
}

/// Symbol for `state`
pub fn symbol_for(state: &str) -> &'static str {
    lookup(state).symbol
}

/// HTTP code for `state`
pub fn code_for(state: &str) -> StatusCode {
    lookup(state).code
}

/// One row of the state table as served by `GET /states`
#[derive(Debug, Clone, Serialize)]
pub struct StateEntry {
    pub state: &'static str,
    pub symbol: &'static str,
    pub code: u16,
}

/// The whole table, in listing order
pub fn known_states() -> Vec<StateEntry> {
    STATES
        .iter()
        .map(|(&state, d)| StateEntry {
            state,
            symbol: d.symbol,
            code: d.code.as_u16(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        let cases = [
            ("success", "✓"),
            ("failure", "✗"),
            ("error", "✗"),
            ("pending", "●"),
            ("warning", "⚠"),
            ("unknown", "○"),
            ("invalid", "?"),
            ("", "?"),
        ];
        for (state, expected) in cases {
            assert_eq!(symbol_for(state), expected, "state {state:?}");
        }
    }

    #[test]
    fn test_codes() {
        let cases = [
            ("success", StatusCode::OK),
            ("failure", StatusCode::EXPECTATION_FAILED),
            ("error", StatusCode::INTERNAL_SERVER_ERROR),
            ("pending", StatusCode::ACCEPTED),
            ("warning", StatusCode::OK),
            ("unknown", StatusCode::NO_CONTENT),
            ("invalid", StatusCode::OK),
            ("", StatusCode::OK),
        ];
        for (state, expected) in cases {
            assert_eq!(code_for(state), expected, "state {state:?}");
        }
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(symbol_for("SUCCESS"), UNRECOGNIZED_SYMBOL);
        assert_eq!(code_for("Pending"), StatusCode::OK);
        assert!(!is_known("SUCCESS"));
        assert!(is_known("unknown"));
        assert!(!is_known(""));
    }

    #[test]
    fn test_known_states_order() {
        let states: Vec<_> = known_states().into_iter().map(|e| e.state).collect();
        assert_eq!(
            states,
            ["success", "failure", "error", "pending", "warning", "unknown"]
        );
    }

    #[test]
    fn test_known_states_codes() {
        let pending = known_states()
            .into_iter()
            .find(|e| e.state == "pending")
            .unwrap();
        assert_eq!(pending.symbol, "●");
        assert_eq!(pending.code, 202);
    }
}
