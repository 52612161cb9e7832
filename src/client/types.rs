//! Gitea API Types
//!
//! Only the fields this service reads are modelled; everything else in the
//! upstream payloads is ignored during decoding.

use serde::{Deserialize, Deserializer, Serialize};

/// Repository information
/// Endpoint: GET /api/v1/repos/{owner}/{repo}
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Repository {
    #[serde(default)]
    pub default_branch: String,
}

/// Combined commit status for a ref
/// Endpoint: GET /api/v1/repos/{owner}/{repo}/commits/{ref}/status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinedStatus {
    /// Aggregate state, e.g. "success" or "pending". Free-form, empty when
    /// absent.
    #[serde(default)]
    pub state: String,
    /// Individual status records, kept opaque
    #[serde(default, deserialize_with = "null_as_empty")]
    pub statuses: Vec<serde_json::Value>,
    #[serde(default)]
    pub total_count: i64,
}

impl CombinedStatus {
    /// State reported when the ref has no status at all
    pub const UNKNOWN: &'static str = "unknown";

    /// Status synthesized for a ref that never had a status reported
    pub fn unknown() -> Self {
        Self {
            state: Self::UNKNOWN.to_string(),
            statuses: Vec::new(),
            total_count: 0,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}
