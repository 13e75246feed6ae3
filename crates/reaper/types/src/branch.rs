//! Source branch references
//!
//! Namespaces carry the URL of the branch they were built from, in the shape
//! a browser shows it: `https://HOST/OWNER/REPO/tree/BRANCH`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Why a source URL could not be turned into a branch reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceUrlError {
    #[error("source url '{url}' is not a valid URL: {reason}")]
    Malformed { url: String, reason: String },

    #[error("source url '{0}' does not match scheme://host/OWNER/REPO/tree/BRANCH")]
    Shape(String),
}

/// Owner/repository/branch triple on a source-control host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchRef {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl BranchRef {
    pub fn new(
        host: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Parse a branch URL.
    ///
    /// Everything after `tree/` is the branch name, so `feature/login`
    /// style branches survive intact.
    pub fn from_source_url(raw: &str) -> Result<Self, SourceUrlError> {
        let url = Url::parse(raw.trim()).map_err(|e| SourceUrlError::Malformed {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SourceUrlError::Shape(raw.to_string()));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SourceUrlError::Shape(raw.to_string()))?;

        // Path segments come back percent-encoded; keep the literal names
        let segments = url
            .path_segments()
            .map(|s| {
                s.filter(|seg| !seg.is_empty())
                    .map(|seg| urlencoding::decode(seg).map(|d| d.into_owned()))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|_| SourceUrlError::Shape(raw.to_string()))?
            .unwrap_or_default();

        match segments.as_slice() {
            [owner, repo, tree, branch @ ..] if tree.as_str() == "tree" && !branch.is_empty() => Ok(Self {
                host: host.to_string(),
                owner: owner.clone(),
                repo: repo.clone(),
                branch: branch.join("/"),
            }),
            _ => Err(SourceUrlError::Shape(raw.to_string())),
        }
    }
}

impl std::fmt::Display for BranchRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.branch)
    }
}
