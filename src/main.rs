//! CLI entry point for blog-api

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_api::config::{Secrets, ServiceConfig};

#[derive(Parser)]
#[command(name = "blog-api")]
#[command(version)]
#[command(about = "JSON API serving localized blog posts from a GitHub repository", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// IP address to bind to (overrides the config file)
    #[arg(short, long)]
    ip: Option<String>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Secret callers must send in the Authorization header
    #[arg(long, env = "API_SECRET", hide_env_values = true)]
    api_secret: Option<String>,

    /// Token used to read the GitHub repository
    #[arg(long, env = "GITHUB_AUTH_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values already in the environment win over .env
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blog_api=debug,info"
    } else {
        "blog_api=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {:?}", path),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Failed to load .env: {}", e),
    }

    let secrets = Secrets::new(cli.api_secret, cli.github_token)?;

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from {:?}", path);
            ServiceConfig::load(path)?
        }
        None => ServiceConfig::default(),
    };
    if let Some(ip) = cli.ip {
        config.ip = ip;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    let api = blog_api::BlogApi::new(config, secrets)?;
    let (ip, port) = (api.config.ip.clone(), api.config.port);
    api.serve(&ip, port).await?;

    Ok(())
}
