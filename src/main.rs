//! Status Relay CLI
//!
//! Serves Gitea commit status for repositories' default branches.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use status_relay::api::{ApiState, start_api_server};
use status_relay::config::{Config, ConfigOverrides};
use status_relay::status::known_states;

/// Status Relay - Gitea build status as JSON
#[derive(Debug, Parser)]
#[command(name = "status-relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    config: ConfigArgs,

    /// Defaults to `serve`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Path to a YAML configuration file
    #[arg(short, long = "config", global = true, env = "STATUS_RELAY_CONFIG")]
    config_file: Option<PathBuf>,

    /// Base URL of the Gitea server
    #[arg(long, global = true, env = "GITEA_URL")]
    gitea_url: Option<String>,

    /// Gitea API token
    #[arg(long, global = true, env = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Port for the HTTP server
    #[arg(short, long, global = true, env = "PORT")]
    port: Option<u16>,

    /// Timeout for each upstream request (e.g. 10s, 1m)
    #[arg(long, global = true, env = "REQUEST_TIMEOUT", value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,
}

impl ConfigArgs {
    fn load(&self) -> Result<Config> {
        let overrides = ConfigOverrides {
            gitea_url: self.gitea_url.clone(),
            token: self.token.clone(),
            port: self.port,
            timeout: self.timeout,
        };
        Config::load(self.config_file.as_deref(), overrides).context("Invalid configuration")
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,

    /// Resolve one repository's status and print it
    Query {
        /// Repository owner
        #[arg(short, long)]
        owner: String,

        /// Repository name
        #[arg(short, long)]
        repo: String,
    },

    /// Generate a default configuration file
    Init {
        /// Output file path
        #[arg(short, long, default_value = "status-relay.yaml")]
        output: PathBuf,
    },

    /// Validate the configuration
    Validate,

    /// List known commit states with their symbol and HTTP code
    States,
}

fn setup_logging(verbose: bool, json: bool) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.json);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.config).await,
        Commands::Query { owner, repo } => query(&cli.config, &owner, &repo).await,
        Commands::Init { output } => init_config(&output),
        Commands::Validate => validate_config(&cli.config),
        Commands::States => {
            list_states();
            Ok(())
        }
    }
}

/// Run the HTTP server until Ctrl-C
async fn serve(args: &ConfigArgs) -> Result<()> {
    let config = args.load()?;
    let service = config
        .to_service()
        .context("Failed to create status service")?;

    tracing::info!(
        port = config.server.port,
        gitea_url = %config.gitea.url,
        timeout = ?config.gitea.timeout,
        "Starting status relay"
    );

    start_api_server(config.server.listen_addr(), ApiState::new(service))
        .await
        .map_err(|e| anyhow::anyhow!(e))
        .context("API server error")
}

/// Resolve a single repository and print the response body
async fn query(args: &ConfigArgs, owner: &str, repo: &str) -> Result<()> {
    let config = args.load()?;
    let service = config
        .to_service()
        .context("Failed to create status service")?;

    let report = service.resolve(owner, repo).await;
    let json = serde_json::to_string_pretty(&report.body).context("Failed to encode response")?;
    println!("{json}");

    if report.is_error() {
        anyhow::bail!("Status request failed with HTTP {}", report.code.as_u16());
    }
    Ok(())
}

/// Generate a default configuration file
fn init_config(output: &Path) -> Result<()> {
    let config = Config::default_config();
    let yaml = config.to_yaml().context("Failed to serialize config")?;

    std::fs::write(output, &yaml)
        .with_context(|| format!("Failed to write config to {}", output.display()))?;

    tracing::info!(path = %output.display(), "Configuration file created");
    println!("Created {}", output.display());
    println!();
    println!("Set the Gitea URL in the file and provide the token via TOKEN, then run:");
    println!("  status-relay --config {} serve", output.display());

    Ok(())
}

/// Validate the effective configuration
fn validate_config(args: &ConfigArgs) -> Result<()> {
    let config = args.load()?;

    println!("Configuration is valid!");
    println!();
    println!("Gitea URL: {}", config.gitea.url);
    println!("Timeout: {}", humantime::format_duration(config.gitea.timeout));
    println!("Listen: {}", config.server.listen_addr());

    Ok(())
}

/// Print the state table
fn list_states() {
    println!("Known states:");
    println!();

    for entry in known_states() {
        println!("  {:10} {}  HTTP {}", entry.state, entry.symbol, entry.code);
    }

    println!();
    println!("Any other state maps to ?  HTTP 200");
}
