//! Source-control host trait definition

use crate::error::SourceResult;
use async_trait::async_trait;
use reaper_types::BranchRef;

/// What the host said about a branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    /// 2xx: the branch exists
    Present,
    /// 404: the branch is gone
    Missing,
    /// Any other status code; treated as "keep"
    Indeterminate(u16),
}

impl BranchState {
    pub fn from_status(code: u16) -> Self {
        match code {
            404 => BranchState::Missing,
            200..=299 => BranchState::Present,
            other => BranchState::Indeterminate(other),
        }
    }

    /// Only an explicit not-found counts as deleted
    pub fn is_deleted(&self) -> bool {
        matches!(self, BranchState::Missing)
    }
}

/// Branch lookups against a source-control host
#[async_trait]
pub trait BranchHost: Send + Sync {
    async fn branch_state(&self, branch: &BranchRef) -> SourceResult<BranchState>;
}
