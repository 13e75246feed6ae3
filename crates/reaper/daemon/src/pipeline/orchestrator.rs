//! Scan loop
//!
//! One scan: discover candidates, fan each one out to its own task, wait
//! for every task, then sleep. Scans never overlap.

use super::chain::TeardownChain;
use super::supervisor::panic_message;
use crate::cluster::NamespaceStore;
use crate::config::PipelineConfig;
use crate::error::StoreError;
use crate::release::ReleaseManager;
use crate::source::BranchHost;
use futures_util::FutureExt;
use reaper_types::{NamespaceOutcome, ScanReport};
use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Delay between the end of one scan and the start of the next
pub const SCAN_INTERVAL: Duration = Duration::from_secs(60);

/// Scan-level failures
#[derive(Debug, Error)]
pub enum ScanError {
    /// Candidate discovery failed; no namespace was processed
    #[error("Namespace discovery failed: {0}")]
    Discovery(#[from] StoreError),
}

/// Owns the scan loop and every scan's candidate set
pub struct Orchestrator {
    store: Arc<dyn NamespaceStore>,
    chain: TeardownChain,
    limiter: Arc<Semaphore>,
    interval: Duration,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        store: Arc<dyn NamespaceStore>,
        releases: Arc<dyn ReleaseManager>,
        branches: Arc<dyn BranchHost>,
        config: &PipelineConfig,
    ) -> Self {
        let chain = TeardownChain::new(store.clone(), releases, branches, config.retry.clone());

        Self {
            store,
            chain,
            limiter: Arc::new(Semaphore::new(config.max_concurrent_namespaces.max(1))),
            interval: SCAN_INTERVAL,
        }
    }

    /// Override the idle delay between scans
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run one full scan and return its completion record
    pub async fn scan(&self) -> Result<ScanReport, ScanError> {
        tracing::info!("Getting namespaces");
        let candidates: Vec<_> = self
            .store
            .list_candidates()
            .await?
            .into_iter()
            .filter(|c| !c.is_terminating())
            .collect();

        tracing::info!(count = candidates.len(), "Found namespaces");

        let mut report = ScanReport::default();
        if candidates.is_empty() {
            return Ok(report);
        }

        // Workers live in the set: dropping the scan aborts every one of them
        let mut workers = JoinSet::new();

        for candidate in candidates {
            let chain = self.chain.clone();
            let limiter = self.limiter.clone();
            let name = candidate.name().to_string();

            workers.spawn(async move {
                let _permit = limiter.acquire_owned().await.ok();
                let outcome = match AssertUnwindSafe(chain.run(candidate)).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(payload) => {
                        let reason = format!("worker panicked: {}", panic_message(payload));
                        tracing::error!(namespace = %name, error = %reason, "Namespace worker faulted");
                        NamespaceOutcome::Faulted { reason }
                    }
                };
                (name, outcome)
            });
        }

        // Barrier: the scan is complete only when every worker has finished
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((name, outcome)) => report.record(name, outcome),
                Err(e) => tracing::error!(error = %e, "Namespace worker did not finish"),
            }
        }

        tracing::info!(
            discovered = report.discovered(),
            terminated = report.terminated(),
            retained = report.retained(),
            aborted = report.aborted(),
            faulted = report.faulted(),
            "Scan complete"
        );

        Ok(report)
    }

    /// Scan forever. Scan failures are logged and retried after the usual delay.
    pub async fn run(&self) -> Infallible {
        loop {
            if let Err(e) = self.scan().await {
                tracing::warn!(error = %e, "Scan failed");
            }

            tracing::info!(delay_secs = self.interval.as_secs(), "Sleeping");
            tokio::time::sleep(self.interval).await;
        }
    }
}
