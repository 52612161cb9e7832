//! Build status resolution
//!
//! - [`states`] - fixed state → symbol / HTTP code table
//! - `service` - the two-step lookup that produces a [`BuildStatus`]

mod service;
pub mod states;

pub use service::{BuildStatus, StatusError, StatusReport, StatusService};
pub use states::{StateDisplay, StateEntry, code_for, is_known, known_states, symbol_for};
