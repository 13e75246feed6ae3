//! Scan loop supervision
//!
//! The orchestrator runs in its own task. If that task dies, the fault is
//! logged and a fresh scan loop starts immediately.

use super::orchestrator::Orchestrator;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinError;

/// A fault that escaped the scan loop
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("scan loop panicked: {0}")]
    Panicked(String),

    #[error("scan loop was cancelled")]
    Cancelled,
}

impl From<JoinError> for SupervisorError {
    fn from(err: JoinError) -> Self {
        if err.is_panic() {
            SupervisorError::Panicked(panic_message(err.into_panic()))
        } else {
            SupervisorError::Cancelled
        }
    }
}

/// Text carried by a panic payload
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Keeps the scan loop alive for the lifetime of the process
pub struct Supervisor {
    orchestrator: Arc<Orchestrator>,
}

impl Supervisor {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Supervise forever
    pub async fn run(self) {
        self.run_until(std::future::pending::<()>()).await;
    }

    /// Supervise until `shutdown` resolves. Returns the number of restarts.
    pub async fn run_until<F>(self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut restarts = 0u64;

        loop {
            let orchestrator = self.orchestrator.clone();
            let mut scan_loop = tokio::spawn(async move { orchestrator.run().await });

            tracing::info!(restarts = restarts, "Scan loop started");

            tokio::select! {
                _ = &mut shutdown => {
                    scan_loop.abort();
                    tracing::info!(restarts = restarts, "Supervisor stopping");
                    return restarts;
                }
                joined = &mut scan_loop => {
                    let err = match joined {
                        Ok(never) => match never {},
                        Err(e) => SupervisorError::from(e),
                    };
                    restarts += 1;
                    tracing::error!(error = %err, restarts = restarts, "Scan loop failed, restarting");
                }
            }
        }
    }
}
