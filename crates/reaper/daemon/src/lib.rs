//! Branch Reaper daemon library
//!
//! This module provides the core components for the reaper daemon:
//! - Cluster, release manager and source-control adapters
//! - Retry-on-conflict wrapper
//! - Reconciliation pipeline and its supervisor
//! - Daemon bootstrap

pub mod cluster;
pub mod config;
pub mod daemon;
pub mod error;
pub mod pipeline;
pub mod release;
pub mod retry;
pub mod source;

pub use cluster::{KubeNamespaceStore, NamespaceStore};
pub use config::ReaperConfig;
pub use daemon::Daemon;
pub use error::{DaemonError, ReleaseError, SourceError, StageError, StoreError};
pub use pipeline::{Orchestrator, Supervisor, TeardownChain};
pub use release::{HelmCli, ReleaseManager, ReleaseStatus};
pub use retry::{retry_on_conflict, Conflict, RetryPolicy};
pub use source::{BranchHost, BranchState, GithubClient};
