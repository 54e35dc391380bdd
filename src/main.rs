//! gh-relay
//!
//! A forwarding gateway for GitHub archives, raw files, git endpoints and gists.

use clap::Parser;
use gh_relay::{
    config::{AppConfig, LogFormat, load_or_init_config, validate_host},
    server::{Gateway, HttpConfig, run_gateway},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// gh-relay - Forwarding gateway for GitHub downloads
#[derive(Parser, Debug)]
#[command(name = "gh-relay")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (created with defaults if missing)
    #[arg(short, long, env = "GH_RELAY_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GH_RELAY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Listen host, overriding the configuration file
    #[arg(long, env = "GH_RELAY_HOST")]
    host: Option<String>,

    /// Listen port, overriding the configuration file
    #[arg(long, env = "GH_RELAY_PORT")]
    port: Option<u16>,
}

fn init_logging(config: &AppConfig, level_override: Option<&str>) {
    let default_level = match level_override {
        Some(level) => level,
        None if config.server.debug => "debug",
        None => config.logging.level.as_str(),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let (mut config, created) = load_or_init_config(args.config.as_deref())?;

    // Initialize logging
    init_logging(&config, args.log_level.as_deref());

    info!(version = env!("CARGO_PKG_VERSION"), "Starting gh-relay");
    if created && let Some(path) = args.config.as_deref() {
        info!(path, "Wrote default configuration");
    }

    // Apply listener overrides
    if let Some(host) = args.host {
        validate_host(&host).inspect_err(|e| error!(error = %e, "Invalid --host"))?;
        config.server.host = host;
    }
    if let Some(port) = args.port {
        if port == 0 {
            anyhow::bail!("--port must be between 1 and 65535");
        }
        config.server.port = port;
    }

    let http_config = HttpConfig::from_host_port(&config.server.host, config.server.port)?;

    // Build the gateway
    let gateway = Arc::new(
        Gateway::new(&config).inspect_err(|e| error!(error = %e, "Failed to create gateway"))?,
    );

    run_gateway(gateway, http_config).await?;

    Ok(())
}
