//! GitHub REST client for branch lookups

use super::traits::{BranchHost, BranchState};
use crate::error::{SourceError, SourceResult};
use async_trait::async_trait;
use reaper_types::BranchRef;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Authenticated client for `GET /repos/{owner}/{repo}/branches/{branch}`
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    api_url: Url,
}

impl GithubClient {
    /// Create a new client. The token is sent as a bearer token on every request.
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> SourceResult<Self> {
        let api_url =
            Url::parse(api_url).map_err(|e| SourceError::InvalidApiUrl(format!("{}: {}", api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(SourceError::InvalidApiUrl(api_url.to_string()));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| SourceError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("branch-reaper/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, api_url })
    }

    /// API URL for a branch; each part is encoded as a single path segment
    pub fn branch_url(&self, branch: &BranchRef) -> SourceResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidApiUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend([
                "repos",
                branch.owner.as_str(),
                branch.repo.as_str(),
                "branches",
                branch.branch.as_str(),
            ]);
        Ok(url)
    }
}

#[async_trait]
impl BranchHost for GithubClient {
    async fn branch_state(&self, branch: &BranchRef) -> SourceResult<BranchState> {
        let url = self.branch_url(branch)?;
        tracing::debug!(url = %url, "Requesting branch");

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();

        Ok(BranchState::from_status(status))
    }
}
