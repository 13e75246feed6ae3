//! Candidate namespace types
//!
//! A CandidateNamespace is the domain view of a labelled cluster namespace:
//! its name, lifecycle phase, and the two annotations the reaper reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Label selector identifying namespaces under management
pub const DEFAULT_LABEL_SELECTOR: &str = "opuscapita.com/buhtig-s8k=true";

/// Prefix shared by the annotations the reaper reads
pub const DEFAULT_ANNOTATION_PREFIX: &str = "opuscapita.com";

/// Annotation holding the branch URL (`https://HOST/OWNER/REPO/tree/BRANCH`)
pub const SOURCE_URL_ANNOTATION: &str = "github-source-url";

/// Annotation naming the release installed into the namespace
pub const RELEASE_ANNOTATION: &str = "helm-release";

/// Namespace lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamespacePhase {
    #[default]
    Active,
    Terminating,
}

impl NamespacePhase {
    /// Map the raw `status.phase` string reported by the cluster.
    ///
    /// A missing or unrecognised phase is treated as active.
    pub fn from_status(phase: Option<&str>) -> Self {
        match phase {
            Some("Terminating") => NamespacePhase::Terminating,
            _ => NamespacePhase::Active,
        }
    }
}

impl std::fmt::Display for NamespacePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamespacePhase::Active => write!(f, "Active"),
            NamespacePhase::Terminating => write!(f, "Terminating"),
        }
    }
}

/// Fully qualified annotation keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationKeys {
    pub source_url: String,
    pub release: String,
}

impl AnnotationKeys {
    /// Build keys of the form `<prefix>/github-source-url` and `<prefix>/helm-release`
    pub fn with_prefix(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return Self {
                source_url: SOURCE_URL_ANNOTATION.to_string(),
                release: RELEASE_ANNOTATION.to_string(),
            };
        }
        Self {
            source_url: format!("{}/{}", prefix, SOURCE_URL_ANNOTATION),
            release: format!("{}/{}", prefix, RELEASE_ANNOTATION),
        }
    }
}

impl Default for AnnotationKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_ANNOTATION_PREFIX)
    }
}

/// Returned when a required annotation is absent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("annotation '{annotation}' not set on namespace '{namespace}'")]
pub struct MissingAnnotation {
    pub namespace: String,
    pub annotation: &'static str,
}

/// A managed environment as observed at discovery time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateNamespace {
    name: String,
    phase: NamespacePhase,
    source_url: Option<String>,
    release_id: Option<String>,
}

impl CandidateNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phase: NamespacePhase::Active,
            source_url: None,
            release_id: None,
        }
    }

    /// Build a candidate from the raw record fields of a cluster namespace
    pub fn from_record(
        name: impl Into<String>,
        phase: Option<&str>,
        annotations: Option<&BTreeMap<String, String>>,
        keys: &AnnotationKeys,
    ) -> Self {
        let lookup = |key: &str| {
            annotations
                .and_then(|a| a.get(key))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            name: name.into(),
            phase: NamespacePhase::from_status(phase),
            source_url: lookup(&keys.source_url),
            release_id: lookup(&keys.release),
        }
    }

    pub fn with_phase(mut self, phase: NamespacePhase) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release_id = Some(release.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> NamespacePhase {
        self.phase
    }

    pub fn is_terminating(&self) -> bool {
        self.phase == NamespacePhase::Terminating
    }

    /// Branch URL this namespace was provisioned from.
    ///
    /// Required for eligibility: a namespace without it is never deleted.
    pub fn source_url(&self) -> Result<&str, MissingAnnotation> {
        self.source_url.as_deref().ok_or_else(|| MissingAnnotation {
            namespace: self.name.clone(),
            annotation: SOURCE_URL_ANNOTATION,
        })
    }

    /// Release to purge before the namespace goes, if any
    pub fn release_id(&self) -> Option<&str> {
        self.release_id.as_deref()
    }
}

impl std::fmt::Display for CandidateNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
