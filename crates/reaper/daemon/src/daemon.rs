//! Daemon setup and lifecycle management

use crate::cluster::KubeNamespaceStore;
use crate::config::ReaperConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::pipeline::{Orchestrator, Supervisor};
use crate::release::HelmCli;
use crate::source::GithubClient;
use std::sync::Arc;
use std::time::Duration;

/// Branch Reaper daemon
pub struct Daemon {
    supervisor: Supervisor,
}

impl Daemon {
    /// Validate configuration and connect every collaborator.
    ///
    /// Fails when the token is missing or the cluster cannot be reached.
    pub async fn new(config: ReaperConfig) -> DaemonResult<Self> {
        config.validate()?;

        let token = config
            .github
            .token
            .as_deref()
            .ok_or_else(|| DaemonError::Config("source-control token is required".to_string()))?;

        let branches = GithubClient::new(
            &config.github.api_url,
            token,
            Duration::from_secs(config.github.request_timeout_secs),
        )?;

        let client = KubeNamespaceStore::connect(&config.cluster).await?;
        let store = KubeNamespaceStore::new(client, &config.cluster);
        let releases = HelmCli::new(&config.helm);

        tracing::info!(
            label_selector = %config.cluster.label_selector,
            release_namespace = %config.helm.namespace,
            max_concurrent = config.pipeline.max_concurrent_namespaces,
            "Reaper configured"
        );

        let orchestrator = Orchestrator::new(
            Arc::new(store),
            Arc::new(releases),
            Arc::new(branches),
            &config.pipeline,
        );

        Ok(Self {
            supervisor: Supervisor::new(orchestrator),
        })
    }

    /// Run until the process receives Ctrl+C or SIGTERM
    pub async fn run(self) -> DaemonResult<()> {
        let restarts = self.supervisor.run_until(shutdown_signal()).await;
        tracing::info!(restarts = restarts, "Branch reaper shutting down");
        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down");
        }
    }
}
