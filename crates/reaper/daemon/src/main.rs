//! Branch Reaper daemon
//!
//! Every minute, finds labelled development namespaces whose source branch
//! has been deleted and removes their release and the namespace itself.

use clap::Parser;
use reaper_daemon::error::{DaemonError, DaemonResult};
use reaper_daemon::{Daemon, ReaperConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Branch Reaper CLI
#[derive(Parser)]
#[command(name = "reaperd")]
#[command(about = "Branch Reaper - removes environments whose branch is gone", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "REAPER_CONFIG")]
    config: Option<String>,

    /// Source-control API token
    #[arg(long, env = "GH_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Namespace the release manager operates in
    #[arg(long, env = "TILLER_NAMESPACE")]
    release_namespace: Option<String>,

    /// Kubeconfig path (in-cluster configuration when unset)
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "REAPER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "REAPER_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = ReaperConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(token) = cli.github_token {
        config.github.token = Some(token);
    }
    if let Some(namespace) = cli.release_namespace {
        config.helm.namespace = namespace;
    }
    if let Some(path) = cli.kubeconfig {
        config.cluster.kubeconfig = Some(path);
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
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

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting branch reaper");

    let daemon = match Daemon::new(config).await {
        Ok(daemon) => daemon,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e);
        }
    };

    daemon.run().await
}
