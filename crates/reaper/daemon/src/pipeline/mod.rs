//! Reconciliation pipeline
//!
//! - `stages`: the three idempotent teardown steps
//! - `chain`: runs the steps in order for one namespace
//! - `orchestrator`: discovery, fan-out, barrier, sleep
//! - `supervisor`: restarts the scan loop when it faults

mod chain;
mod orchestrator;
mod stages;
mod supervisor;

pub use chain::TeardownChain;
pub use orchestrator::{Orchestrator, ScanError, SCAN_INTERVAL};
pub use stages::{check_branch, terminate_namespace, terminate_release};
pub use supervisor::{Supervisor, SupervisorError};
