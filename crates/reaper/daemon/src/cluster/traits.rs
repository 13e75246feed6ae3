//! Namespace store trait definition

use crate::error::StoreResult;
use async_trait::async_trait;
use reaper_types::CandidateNamespace;

/// Access to managed namespaces.
///
/// Implementations are shared by every worker of a scan and must be safe
/// for concurrent use.
#[async_trait]
pub trait NamespaceStore: Send + Sync {
    /// List managed namespaces that are not already terminating
    async fn list_candidates(&self) -> StoreResult<Vec<CandidateNamespace>>;

    /// Fetch a namespace by name; `None` when it does not exist
    async fn get_namespace(&self, name: &str) -> StoreResult<Option<CandidateNamespace>>;

    /// Issue a delete for a namespace
    async fn delete_namespace(&self, name: &str) -> StoreResult<()>;
}
