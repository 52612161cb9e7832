//! Gitea API Client
//!
//! Hand-written client for the two Gitea endpoints behind a commit status:
//! repository info (for the default branch) and the combined status of a ref.
//! All traffic goes through the [`Transport`] trait so tests can run without
//! a network.

pub mod fake;
mod gitea;
mod transport;
mod types;

pub use gitea::{GiteaClient, GiteaError, GiteaResult};
pub use transport::{
    DEFAULT_TIMEOUT, HttpTransport, Transport, TransportError, TransportRequest, TransportResponse,
};
pub use types::*;
