//! Configuration
//!
//! Settings come from an optional YAML file, overridden by command-line
//! flags, which clap also reads from the environment (`GITEA_URL`, `TOKEN`,
//! `PORT`, `REQUEST_TIMEOUT`).
//!
//! ## Configuration Format
//!
//! ```yaml
//! gitea:
//!   url: https://gitea.example.com
//!   token: <api token>
//!   timeout: 10s
//!
//! server:
//!   port: 8080
//! ```

mod settings;

pub use settings::{
    Config, ConfigError, ConfigOverrides, DEFAULT_PORT, GiteaConfig, ServerConfig,
};
