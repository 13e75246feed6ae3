//! Release manager trait definition

use crate::error::ReleaseResult;
use async_trait::async_trait;

/// Lifecycle status reported for a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseStatus {
    Deployed,
    Failed,
    Superseded,
    Pending(String),
    Uninstalling,
    Uninstalled,
    Unknown(String),
}

impl ReleaseStatus {
    /// Map a status string as printed by the release manager.
    ///
    /// Older releases report `DELETING`/`DELETED`; both count as removal.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "deployed" => ReleaseStatus::Deployed,
            "failed" => ReleaseStatus::Failed,
            "superseded" => ReleaseStatus::Superseded,
            "uninstalling" | "deleting" => ReleaseStatus::Uninstalling,
            "uninstalled" | "deleted" => ReleaseStatus::Uninstalled,
            s if s.starts_with("pending") => ReleaseStatus::Pending(s.to_string()),
            _ => ReleaseStatus::Unknown(raw.trim().to_string()),
        }
    }

    /// Release is already on its way out; deleting again would be a no-op
    pub fn is_gone(&self) -> bool {
        matches!(self, ReleaseStatus::Uninstalling | ReleaseStatus::Uninstalled)
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseStatus::Deployed => write!(f, "deployed"),
            ReleaseStatus::Failed => write!(f, "failed"),
            ReleaseStatus::Superseded => write!(f, "superseded"),
            ReleaseStatus::Pending(s) | ReleaseStatus::Unknown(s) => write!(f, "{}", s),
            ReleaseStatus::Uninstalling => write!(f, "uninstalling"),
            ReleaseStatus::Uninstalled => write!(f, "uninstalled"),
        }
    }
}

/// Access to the release manager
#[async_trait]
pub trait ReleaseManager: Send + Sync {
    /// Current status of a release; `None` when it does not exist
    async fn release_status(&self, name: &str) -> ReleaseResult<Option<ReleaseStatus>>;

    /// Hard-delete a release so its name can be reused
    async fn purge_release(&self, name: &str) -> ReleaseResult<()>;
}
