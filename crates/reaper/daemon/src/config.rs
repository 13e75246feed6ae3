//! Configuration for reaper-daemon

use crate::error::DaemonError;
use crate::retry::RetryPolicy;
use reaper_types::{AnnotationKeys, DEFAULT_ANNOTATION_PREFIX, DEFAULT_LABEL_SELECTOR};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Source-control host configuration
    #[serde(default)]
    pub github: GithubConfig,

    /// Cluster configuration
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// Release manager configuration
    #[serde(default)]
    pub helm: HelmConfig,

    /// Pipeline configuration
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source-control host configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API token; required
    #[serde(default)]
    pub token: Option<String>,

    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Cluster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Exact-match `key=value` label marking managed namespaces
    #[serde(default = "default_label_selector")]
    pub label_selector: String,

    /// Prefix of the source-url and release annotations
    #[serde(default = "default_annotation_prefix")]
    pub annotation_prefix: String,

    /// Server-side timeout for namespace listing, in seconds
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u32,

    /// Kubeconfig path; in-cluster or default kubeconfig when unset
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            label_selector: default_label_selector(),
            annotation_prefix: default_annotation_prefix(),
            list_timeout_secs: default_list_timeout(),
            kubeconfig: None,
        }
    }
}

impl ClusterConfig {
    pub fn annotation_keys(&self) -> AnnotationKeys {
        AnnotationKeys::with_prefix(&self.annotation_prefix)
    }
}

/// Release manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelmConfig {
    /// Path or name of the helm binary
    #[serde(default = "default_helm_binary")]
    pub binary: String,

    /// Namespace the release manager operates in
    #[serde(default = "default_release_namespace")]
    pub namespace: String,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            binary: default_helm_binary(),
            namespace: default_release_namespace(),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Upper bound on namespaces processed at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_namespaces: usize,

    /// Conflict retry policy for teardown calls
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_namespaces: default_max_concurrent(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_label_selector() -> String {
    DEFAULT_LABEL_SELECTOR.to_string()
}

fn default_annotation_prefix() -> String {
    DEFAULT_ANNOTATION_PREFIX.to_string()
}

fn default_list_timeout() -> u32 {
    60
}

fn default_helm_binary() -> String {
    "helm".to_string()
}

fn default_release_namespace() -> String {
    "kube-system".to_string()
}

fn default_max_concurrent() -> usize {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ReaperConfig {
    /// Load configuration from defaults, an optional file, and `REAPER__*` variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&ReaperConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Nested keys contain underscores, so sections are split on "__"
        builder = builder.add_source(
            config::Environment::with_prefix("REAPER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Reject configurations the daemon cannot start with
    pub fn validate(&self) -> Result<(), DaemonError> {
        match self.github.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {}
            _ => {
                return Err(DaemonError::Config(
                    "source-control token is required (GH_TOKEN)".to_string(),
                ))
            }
        }

        url::Url::parse(&self.github.api_url).map_err(|e| {
            DaemonError::Config(format!("Invalid API url '{}': {}", self.github.api_url, e))
        })?;

        match self.cluster.label_selector.split_once('=') {
            Some((key, value))
                if !key.trim().is_empty()
                    && !value.trim().is_empty()
                    && !value.contains('=')
                    && !key.ends_with('!') => {}
            _ => {
                return Err(DaemonError::Config(format!(
                    "label selector must be a single key=value pair, got '{}'",
                    self.cluster.label_selector
                )))
            }
        }

        if self.pipeline.max_concurrent_namespaces == 0 {
            return Err(DaemonError::Config(
                "max_concurrent_namespaces must be at least 1".to_string(),
            ));
        }

        let retry = &self.pipeline.retry;
        if retry.attempts == 0 {
            return Err(DaemonError::Config(
                "retry attempts must be at least 1".to_string(),
            ));
        }
        if !retry.factor.is_finite() || retry.factor < 1.0 {
            return Err(DaemonError::Config(format!(
                "retry factor must be a finite number >= 1.0, got {}",
                retry.factor
            )));
        }
        if !(0.0..=1.0).contains(&retry.jitter) {
            return Err(DaemonError::Config(format!(
                "retry jitter must be within 0.0..=1.0, got {}",
                retry.jitter
            )));
        }

        Ok(())
    }
}
