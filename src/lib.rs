//! Status Relay - Gitea build status as a tiny JSON contract
//!
//! Looks up the combined commit status of a repository's default branch on a
//! Gitea server and republishes it as a symbol plus an HTTP status code, so
//! dashboards and badges can consume it without talking to Gitea directly.
//!
//! ## Request flow
//!
//! `GET /status?owner=&repo=` → [`status::StatusService`] →
//! [`client::GiteaClient`] (repository info, then commit status, both via a
//! [`client::Transport`]) → [`status::states`] → JSON response.
//!
//! ## Modules
//!
//! - [`client`] - Gitea API client and the transport abstraction
//! - [`status`] - State mapping and status resolution
//! - [`api`] - HTTP server
//! - [`config`] - Configuration loading

pub mod api;
pub mod client;
pub mod config;
pub mod status;
