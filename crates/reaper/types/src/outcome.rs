//! Scan run outcomes
//!
//! Every namespace discovered by a scan leaves its teardown chain exactly
//! once, with one of the outcomes below. A scan is complete when all of its
//! namespaces have an outcome.

use serde::{Deserialize, Serialize};

/// Steps of the per-namespace teardown chain, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    BranchCheck,
    ReleaseTermination,
    NamespaceTermination,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::BranchCheck => write!(f, "branch-check"),
            Stage::ReleaseTermination => write!(f, "release-termination"),
            Stage::NamespaceTermination => write!(f, "namespace-termination"),
        }
    }
}

/// Result of asking the release manager to remove a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseTermination {
    /// A purge was issued
    Purged,
    /// Release absent or already being removed; nothing was done
    AlreadyGone,
}

/// Result of asking the cluster to remove a namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceTermination {
    /// A delete was issued
    Deleted,
    /// Namespace was already in the Terminating phase
    AlreadyTerminating,
    /// Namespace no longer exists
    AlreadyGone,
}

/// How one namespace left the chain during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NamespaceOutcome {
    /// Branch still exists (or the host answered something other than 404)
    Retained,

    /// Branch is gone and the environment was torn down
    Terminated {
        /// `None` when the namespace carries no release annotation
        release: Option<ReleaseTermination>,
        namespace: NamespaceTermination,
    },

    /// A stage said "do not proceed"; retried on the next scan
    Aborted { stage: Stage, reason: String },

    /// The worker panicked; retried on the next scan
    Faulted { reason: String },
}

impl NamespaceOutcome {
    pub fn is_terminated(&self) -> bool {
        matches!(self, NamespaceOutcome::Terminated { .. })
    }

    pub fn is_retained(&self) -> bool {
        matches!(self, NamespaceOutcome::Retained)
    }

    /// Stage that stopped the chain, if it was a stage abort
    pub fn aborted_at(&self) -> Option<Stage> {
        match self {
            NamespaceOutcome::Aborted { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Completion record of one scan run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Outcome per namespace, keyed by namespace name
    pub outcomes: Vec<(String, NamespaceOutcome)>,
}

impl ScanReport {
    pub fn record(&mut self, namespace: impl Into<String>, outcome: NamespaceOutcome) {
        self.outcomes.push((namespace.into(), outcome));
    }

    /// Number of namespaces the scan dispatched
    pub fn discovered(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcome(&self, namespace: &str) -> Option<&NamespaceOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == namespace)
            .map(|(_, outcome)| outcome)
    }

    pub fn terminated(&self) -> usize {
        self.count(NamespaceOutcome::is_terminated)
    }

    pub fn retained(&self) -> usize {
        self.count(NamespaceOutcome::is_retained)
    }

    pub fn aborted(&self) -> usize {
        self.count(|o| o.aborted_at().is_some())
    }

    pub fn faulted(&self) -> usize {
        self.count(|o| matches!(o, NamespaceOutcome::Faulted { .. }))
    }

    fn count(&self, pred: impl Fn(&NamespaceOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = ScanReport::default();
        report.record("a", NamespaceOutcome::Retained);
        report.record(
            "b",
            NamespaceOutcome::Terminated {
                release: None,
                namespace: NamespaceTermination::Deleted,
            },
        );
        report.record(
            "c",
            NamespaceOutcome::Aborted {
                stage: Stage::BranchCheck,
                reason: "annotation missing".to_string(),
            },
        );
        report.record(
            "d",
            NamespaceOutcome::Faulted {
                reason: "boom".to_string(),
            },
        );

        assert_eq!(report.discovered(), 4);
        assert_eq!(report.retained(), 1);
        assert_eq!(report.terminated(), 1);
        assert_eq!(report.aborted(), 1);
        assert_eq!(report.faulted(), 1);
        assert_eq!(
            report.outcome("c").and_then(NamespaceOutcome::aborted_at),
            Some(Stage::BranchCheck)
        );
        assert!(report.outcome("missing").is_none());
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let outcome = NamespaceOutcome::Aborted {
            stage: Stage::ReleaseTermination,
            reason: "helm unreachable".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "aborted");
        assert_eq!(json["stage"], "release_termination");
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::BranchCheck.to_string(), "branch-check");
        assert_eq!(Stage::NamespaceTermination.to_string(), "namespace-termination");
    }
}
