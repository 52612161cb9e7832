//! Service configuration types

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::client::{DEFAULT_TIMEOUT, GiteaClient, HttpTransport, Transport};
use crate::status::StatusService;

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 8080;

/// Errors that can occur during configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create client: {0}")]
    Client(#[from] crate::client::GiteaError),

    #[error("Failed to create transport: {0}")]
    Transport(#[from] crate::client::TransportError),
}

/// Upstream Gitea server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiteaConfig {
    /// Base URL (e.g., "https://git.example.com")
    #[serde(default)]
    pub url: String,

    /// API token sent as `Authorization: token <token>`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Timeout applied to every upstream request
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl Default for GiteaConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Address to bind on all interfaces
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

/// Values taken from the command line or environment
///
/// Each set field replaces the corresponding file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub gitea_url: Option<String>,
    pub token: Option<String>,
    pub port: Option<u16>,
    pub timeout: Option<Duration>,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gitea: GiteaConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load an optional file, apply overrides and validate the result
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Replace file values with any set overrides
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.gitea_url {
            self.gitea.url = url;
        }
        if let Some(token) = overrides.token {
            self.gitea.token = token;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(timeout) = overrides.timeout {
            self.gitea.timeout = timeout;
        }
        self
    }

    /// Check that required values are present and well-formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gitea.url.is_empty() {
            return Err(ConfigError::Missing("GITEA_URL"));
        }
        if self.gitea.token.is_empty() {
            return Err(ConfigError::Missing("TOKEN"));
        }

        let url = Url::parse(&self.gitea.url)
            .map_err(|e| ConfigError::Invalid(format!("gitea url {:?}: {e}", self.gitea.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "gitea url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.gitea.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be positive".into()));
        }
        Ok(())
    }

    /// Build the status service over the real network
    pub fn to_service(&self) -> Result<StatusService, ConfigError> {
        let transport = Arc::new(HttpTransport::new(self.gitea.timeout)?);
        self.to_service_with(transport)
    }

    /// Build the status service over a caller-supplied transport
    pub fn to_service_with(
        &self,
        transport: Arc<dyn Transport>,
    ) -> Result<StatusService, ConfigError> {
        let client = GiteaClient::new(&self.gitea.url, &self.gitea.token, transport)?;
        Ok(StatusService::new(client))
    }

    /// Generate a starter configuration
    pub fn default_config() -> Self {
        Config {
            gitea: GiteaConfig {
                url: "https://gitea.example.com".to_string(),
                token: String::new(),
                timeout: DEFAULT_TIMEOUT,
            },
            server: ServerConfig::default(),
        }
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::ScriptedTransport;

    const SAMPLE_CONFIG: &str = r"
gitea:
  url: https://git.example.com
  token: secret
  timeout: 5s
server:
  port: 9090
";

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.gitea.url, "https://git.example.com");
        assert_eq!(config.gitea.token, "secret");
        assert_eq!(config.gitea.timeout, Duration::from_secs(5));
        assert_eq!(config.server.port, 9090);
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("gitea:\n  url: https://git.example.com\n").unwrap();
        assert_eq!(config.gitea.timeout, Duration::from_secs(10));
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.server.listen_addr(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_missing_url() {
        let err = Config::load(None, ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("GITEA_URL")));
    }

    #[test]
    fn test_missing_token() {
        let overrides = ConfigOverrides {
            gitea_url: Some("https://git.example.com".into()),
            ..Default::default()
        };
        let err = Config::load(None, overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TOKEN")));
        assert_eq!(err.to_string(), "TOKEN is required");
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let config = Config::from_yaml(SAMPLE_CONFIG)
            .unwrap()
            .with_overrides(ConfigOverrides {
                gitea_url: None,
                token: Some("from-env".into()),
                port: Some(3000),
                timeout: Some(Duration::from_secs(1)),
            });
        assert_eq!(config.gitea.url, "https://git.example.com");
        assert_eq!(config.gitea.token, "from-env");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.gitea.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
        config.gitea.url = "ftp://git.example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.gitea.url = "git.example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.yaml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();

        let config = Config::load(Some(path.as_path()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.server.port, 9090);
    }

    #[test]
    fn test_to_service() {
        let config = Config::from_yaml(SAMPLE_CONFIG).unwrap();
        let service = config
            .to_service_with(Arc::new(ScriptedTransport::new()))
            .unwrap();
        assert_eq!(
            service.client().base_url().as_str(),
            "https://git.example.com/"
        );
    }

    #[test]
    fn test_roundtrip_omits_empty_token() {
        let config = Config::default_config();
        let yaml = config.to_yaml().unwrap();
        assert!(!yaml.contains("token"));

        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.gitea.url, parsed.gitea.url);
        assert_eq!(config.gitea.timeout, parsed.gitea.timeout);
        assert_eq!(config.server.port, parsed.server.port);
    }
}
