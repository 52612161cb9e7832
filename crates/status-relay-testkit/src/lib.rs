//! Status Relay Test Kit
//!
//! Test infrastructure for status-relay.
//!
//! This crate provides:
//! - [`MockGitea`], an in-memory Gitea answering the repository-info and
//!   commit-status endpoints from scripted repositories
//!
//! # Example
//!
//! ```rust
//! use status_relay_testkit::{MockGitea, MockRepo};
//!
//! let gitea = MockGitea::new("https://git.example.com")
//!     .with_repo(MockRepo::new("acme", "widget").with_state("main", "pending"));
//!
//! let (status, _) =
//!     gitea.respond("https://git.example.com/api/v1/repos/acme/widget/commits/main/status");
//! assert_eq!(status, 200);
//! ```

pub mod mock;

pub use mock::{MockFailure, MockGitea, MockRepo};
