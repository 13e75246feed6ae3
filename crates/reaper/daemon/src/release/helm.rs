//! Helm CLI release manager

use super::traits::{ReleaseManager, ReleaseStatus};
use crate::config::HelmConfig;
use crate::error::{ReleaseError, ReleaseResult};
use async_trait::async_trait;
use tokio::process::Command;

/// Release manager driving the `helm` binary
#[derive(Debug, Clone)]
pub struct HelmCli {
    binary: String,
    namespace: String,
}

impl HelmCli {
    pub fn new(config: &HelmConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            namespace: config.namespace.clone(),
        }
    }

    async fn run(&self, args: &[&str]) -> ReleaseResult<Vec<u8>> {
        tracing::debug!(binary = %self.binary, args = ?args, namespace = %self.namespace, "Running helm");

        let output = Command::new(&self.binary)
            .args(args)
            .arg("--namespace")
            .arg(&self.namespace)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ReleaseError::Io(format!("{}: {}", self.binary, e)))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(classify_failure(&String::from_utf8_lossy(&output.stderr)))
        }
    }
}

/// Turn helm's stderr into a typed error
fn classify_failure(stderr: &str) -> ReleaseError {
    let message = stderr.trim().trim_start_matches("Error: ").to_string();
    let lower = message.to_ascii_lowercase();

    // Only helm's own release-absence error; other "not found" text
    // (missing plugins, unreachable clusters) is a real failure.
    if lower.contains("release: not found") {
        ReleaseError::NotFound(message)
    } else if lower.contains("another operation") && lower.contains("in progress") {
        ReleaseError::Conflict(message)
    } else {
        ReleaseError::Command(message)
    }
}

/// Extract `info.status` from `helm status --output json`
fn parse_status(stdout: &[u8]) -> ReleaseResult<ReleaseStatus> {
    let value: serde_json::Value =
        serde_json::from_slice(stdout).map_err(|e| ReleaseError::Parse(e.to_string()))?;

    value
        .pointer("/info/status")
        .and_then(serde_json::Value::as_str)
        .map(ReleaseStatus::parse)
        .ok_or_else(|| ReleaseError::Parse("missing info.status".to_string()))
}

#[async_trait]
impl ReleaseManager for HelmCli {
    async fn release_status(&self, name: &str) -> ReleaseResult<Option<ReleaseStatus>> {
        match self.run(&["status", name, "--output", "json"]).await {
            Ok(stdout) => parse_status(&stdout).map(Some),
            Err(ReleaseError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn purge_release(&self, name: &str) -> ReleaseResult<()> {
        let stdout = self.run(&["uninstall", name]).await?;
        tracing::debug!(
            release = %name,
            response = %String::from_utf8_lossy(&stdout).trim(),
            "helm uninstall"
        );
        Ok(())
    }
}
