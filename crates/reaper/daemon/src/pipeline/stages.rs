//! Teardown stages
//!
//! Each stage is idempotent: running it against a target that is already
//! gone (or going) succeeds without side effects.

use crate::cluster::NamespaceStore;
use crate::error::{ReleaseError, ReleaseResult, StageError, StoreError, StoreResult};
use crate::release::ReleaseManager;
use crate::source::BranchHost;
use reaper_types::{BranchRef, CandidateNamespace, NamespaceTermination, ReleaseTermination};

/// Branch-status check.
///
/// Returns `true` only when the host explicitly reports the branch as not
/// found. A missing annotation, a malformed URL or a failed request is a
/// stage error.
pub async fn check_branch(
    host: &dyn BranchHost,
    candidate: &CandidateNamespace,
) -> Result<bool, StageError> {
    let source_url = candidate.source_url()?;
    let branch = BranchRef::from_source_url(source_url)?;

    let state = host.branch_state(&branch).await?;
    let deleted = state.is_deleted();

    tracing::info!(
        namespace = %candidate.name(),
        branch = %branch,
        state = ?state,
        deleted = deleted,
        "Branch checked"
    );

    Ok(deleted)
}

/// Release termination: purge unless the release is absent or already being removed
pub async fn terminate_release(
    releases: &dyn ReleaseManager,
    name: &str,
) -> ReleaseResult<ReleaseTermination> {
    let status = match releases.release_status(name).await? {
        None => {
            tracing::debug!(release = %name, "Release does not exist");
            return Ok(ReleaseTermination::AlreadyGone);
        }
        Some(status) if status.is_gone() => {
            tracing::debug!(release = %name, status = %status, "Release already removed, skipping");
            return Ok(ReleaseTermination::AlreadyGone);
        }
        Some(status) => status,
    };

    tracing::info!(release = %name, status = %status, "Deleting release");
    match releases.purge_release(name).await {
        Ok(()) => Ok(ReleaseTermination::Purged),
        Err(ReleaseError::NotFound(_)) => Ok(ReleaseTermination::AlreadyGone),
        Err(e) => Err(e),
    }
}

/// Namespace termination: re-read the namespace, then delete if still active
pub async fn terminate_namespace(
    store: &dyn NamespaceStore,
    name: &str,
) -> StoreResult<NamespaceTermination> {
    match store.get_namespace(name).await? {
        None => {
            tracing::debug!(namespace = %name, "Namespace already gone");
            Ok(NamespaceTermination::AlreadyGone)
        }
        Some(ns) if ns.is_terminating() => {
            tracing::warn!(namespace = %name, "Namespace is already terminating, bailing out");
            Ok(NamespaceTermination::AlreadyTerminating)
        }
        Some(_) => {
            tracing::info!(namespace = %name, "Deleting namespace");
            match store.delete_namespace(name).await {
                Ok(()) => Ok(NamespaceTermination::Deleted),
                Err(StoreError::NotFound(_)) => Ok(NamespaceTermination::AlreadyGone),
                Err(e) => Err(e),
            }
        }
    }
}
