//! Per-namespace teardown chain

use super::stages::{check_branch, terminate_namespace, terminate_release};
use crate::cluster::NamespaceStore;
use crate::release::ReleaseManager;
use crate::retry::{retry_on_conflict, RetryPolicy};
use crate::source::BranchHost;
use reaper_types::{CandidateNamespace, NamespaceOutcome, Stage};
use std::sync::Arc;

/// Runs branch-check → release-termination → namespace-termination for one
/// namespace. Cloned into every worker; all handles are shared read-only.
#[derive(Clone)]
pub struct TeardownChain {
    store: Arc<dyn NamespaceStore>,
    releases: Arc<dyn ReleaseManager>,
    branches: Arc<dyn BranchHost>,
    retry: RetryPolicy,
}

impl TeardownChain {
    pub fn new(
        store: Arc<dyn NamespaceStore>,
        releases: Arc<dyn ReleaseManager>,
        branches: Arc<dyn BranchHost>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            releases,
            branches,
            retry,
        }
    }

    /// Drive one namespace through the chain.
    ///
    /// A stage that fails ends the chain; the namespace is picked up again
    /// by the next scan. A failed release termination keeps the namespace so
    /// the release is never orphaned.
    pub async fn run(&self, candidate: CandidateNamespace) -> NamespaceOutcome {
        let name = candidate.name().to_string();

        let deleted = match check_branch(self.branches.as_ref(), &candidate).await {
            Ok(deleted) => deleted,
            Err(e) => return abort(&name, Stage::BranchCheck, e),
        };

        if !deleted {
            tracing::info!(namespace = %name, "Branch still exists, do nothing");
            return NamespaceOutcome::Retained;
        }

        tracing::info!(namespace = %name, "Branch is gone, terminating environment");

        let release = match candidate.release_id() {
            None => {
                tracing::info!(namespace = %name, "No release annotation, skipping release termination");
                None
            }
            Some(release_id) => {
                let releases = self.releases.as_ref();
                match retry_on_conflict(&self.retry, || terminate_release(releases, release_id)).await
                {
                    Ok(result) => {
                        tracing::info!(namespace = %name, release = %release_id, result = ?result, "Release terminated");
                        Some(result)
                    }
                    Err(e) => return abort(&name, Stage::ReleaseTermination, e),
                }
            }
        };

        let store = self.store.as_ref();
        match retry_on_conflict(&self.retry, || terminate_namespace(store, &name)).await {
            Ok(namespace) => {
                tracing::info!(namespace = %name, result = ?namespace, "Namespace terminated successfully");
                NamespaceOutcome::Terminated { release, namespace }
            }
            Err(e) => abort(&name, Stage::NamespaceTermination, e),
        }
    }
}

fn abort(namespace: &str, stage: Stage, error: impl std::fmt::Display) -> NamespaceOutcome {
    tracing::warn!(namespace = %namespace, stage = %stage, error = %error, "Stage aborted");
    NamespaceOutcome::Aborted {
        stage,
        reason: error.to_string(),
    }
}
