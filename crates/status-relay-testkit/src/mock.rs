//! In-memory Gitea server for testing
//!
//! Answers the two commit-status endpoints from a scripted set of
//! repositories. Responses are plain `(status, body)` pairs so the fixture
//! can sit behind any transport.
//!
//! # Example
//!
//! ```rust
//! use status_relay_testkit::mock::{MockGitea, MockRepo};
//!
//! let gitea = MockGitea::new("https://git.example.com")
//!     .with_repo(MockRepo::new("acme", "widget").with_state("main", "success"));
//!
//! let (status, body) = gitea.respond("https://git.example.com/api/v1/repos/acme/widget");
//! assert_eq!(status, 200);
//! assert!(body.contains("\"default_branch\":\"main\""));
//! ```

use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;

/// A canned failure returned instead of the normal response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFailure {
    pub status: u16,
    pub body: String,
}

impl MockFailure {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Mock representation of a Gitea repository
#[derive(Debug, Clone)]
pub struct MockRepo {
    pub owner: String,
    pub name: String,
    /// Default branch reported by repository info
    pub default_branch: String,
    /// Combined state per branch; branches without an entry answer 404
    pub states: HashMap<String, String>,
    /// Number of individual status records reported per branch
    pub status_count: usize,
    /// Override for the repository-info endpoint
    pub info_failure: Option<MockFailure>,
    /// Override for the commit-status endpoint
    pub status_failure: Option<MockFailure>,
}

impl MockRepo {
    /// Create a repository whose default branch is `main` and has no statuses
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            default_branch: "main".to_string(),
            states: HashMap::new(),
            status_count: 1,
            info_failure: None,
            status_failure: None,
        }
    }

    /// Set the default branch
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    /// Report `state` as the combined status of `branch`
    pub fn with_state(mut self, branch: impl Into<String>, state: impl Into<String>) -> Self {
        self.states.insert(branch.into(), state.into());
        self
    }

    /// Fail the repository-info endpoint
    pub fn with_info_failure(mut self, status: u16, body: impl Into<String>) -> Self {
        self.info_failure = Some(MockFailure::new(status, body));
        self
    }

    /// Fail the commit-status endpoint
    pub fn with_status_failure(mut self, status: u16, body: impl Into<String>) -> Self {
        self.status_failure = Some(MockFailure::new(status, body));
        self
    }

    fn info_body(&self) -> String {
        json!({
            "name": self.name,
            "full_name": format!("{}/{}", self.owner, self.name),
            "default_branch": self.default_branch,
        })
        .to_string()
    }

    fn status_body(&self, state: &str) -> String {
        let statuses: Vec<_> = (0..self.status_count)
            .map(|i| json!({ "id": i + 1, "status": state, "context": format!("ci/{}", i + 1) }))
            .collect();
        json!({
            "state": state,
            "statuses": statuses,
            "total_count": self.status_count,
        })
        .to_string()
    }
}

/// Mock Gitea server
#[derive(Debug)]
pub struct MockGitea {
    base_url: String,
    repos: HashMap<(String, String), MockRepo>,
    requests: Mutex<Vec<String>>,
}

impl MockGitea {
    /// Create a server rooted at `base_url` (no trailing slash needed)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            repos: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Add a repository (builder pattern)
    pub fn with_repo(mut self, repo: MockRepo) -> Self {
        self.add_repo(repo);
        self
    }

    /// Add a repository
    pub fn add_repo(&mut self, repo: MockRepo) {
        self.repos
            .insert((repo.owner.clone(), repo.name.clone()), repo);
    }

    /// Base URL the server answers on
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer a GET for `url` with `(status, body)`
    pub fn respond(&self, url: &str) -> (u16, String) {
        self.requests.lock().push(url.to_string());

        let Some(path) = url
            .strip_prefix(&self.base_url)
            .and_then(|p| p.strip_prefix("/api/v1/repos/"))
        else {
            return not_found("route not found");
        };

        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            [owner, repo] => match self.repo(owner, repo) {
                Some(r) => match &r.info_failure {
                    Some(f) => (f.status, f.body.clone()),
                    None => (200, r.info_body()),
                },
                None => not_found("Repository not found"),
            },
            [owner, repo, "commits", rest @ .., "status"] if !rest.is_empty() => {
                let branch = rest.join("/");
                match self.repo(owner, repo) {
                    Some(r) => match (&r.status_failure, r.states.get(&branch)) {
                        (Some(f), _) => (f.status, f.body.clone()),
                        (None, Some(state)) => (200, r.status_body(state)),
                        (None, None) => not_found("no status for ref"),
                    },
                    None => not_found("Repository not found"),
                }
            }
            _ => not_found("route not found"),
        }
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Number of requests answered
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn repo(&self, owner: &str, name: &str) -> Option<&MockRepo> {
        self.repos.get(&(owner.to_string(), name.to_string()))
    }
}

fn not_found(message: &str) -> (u16, String) {
    (404, json!({ "message": message }).to_string())
}
