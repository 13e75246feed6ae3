//! Kubernetes-backed namespace store

use super::traits::NamespaceStore;
use crate::config::ClusterConfig;
use crate::error::{DaemonError, DaemonResult, StoreResult};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{DeleteParams, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client};
use reaper_types::{AnnotationKeys, CandidateNamespace};

/// Namespace store talking to the Kubernetes API server
#[derive(Clone)]
pub struct KubeNamespaceStore {
    api: Api<Namespace>,
    label_selector: String,
    list_timeout_secs: u32,
    keys: AnnotationKeys,
}

impl KubeNamespaceStore {
    /// Create a store over an existing client
    pub fn new(client: Client, config: &ClusterConfig) -> Self {
        Self {
            api: Api::all(client),
            label_selector: config.label_selector.clone(),
            list_timeout_secs: config.list_timeout_secs,
            keys: config.annotation_keys(),
        }
    }

    /// Build a client from the configured kubeconfig, or infer one
    /// (in-cluster service account first, then the default kubeconfig).
    ///
    /// The API server is probed once so an unreachable cluster fails startup.
    pub async fn connect(config: &ClusterConfig) -> DaemonResult<Client> {
        let kube_config = match &config.kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    DaemonError::Cluster(format!("Failed to read {}: {}", path.display(), e))
                })?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| DaemonError::Cluster(e.to_string()))?
            }
            None => kube::Config::infer()
                .await
                .map_err(|e| DaemonError::Cluster(e.to_string()))?,
        };

        let client =
            Client::try_from(kube_config).map_err(|e| DaemonError::Cluster(e.to_string()))?;

        let version = client
            .apiserver_version()
            .await
            .map_err(|e| DaemonError::Cluster(format!("API server unreachable: {}", e)))?;

        tracing::info!(
            version = %version.git_version,
            platform = %version.platform,
            "Connected to cluster"
        );

        Ok(client)
    }

    fn to_candidate(&self, ns: Namespace) -> CandidateNamespace {
        candidate_from_namespace(ns, &self.keys)
    }
}

/// Wrap a raw namespace record in the domain type
pub fn candidate_from_namespace(ns: Namespace, keys: &AnnotationKeys) -> CandidateNamespace {
    let phase = ns.status.as_ref().and_then(|s| s.phase.as_deref());
    CandidateNamespace::from_record(
        ns.metadata.name.clone().unwrap_or_default(),
        phase,
        ns.metadata.annotations.as_ref(),
        keys,
    )
}

#[async_trait]
impl NamespaceStore for KubeNamespaceStore {
    async fn list_candidates(&self) -> StoreResult<Vec<CandidateNamespace>> {
        let params = ListParams::default()
            .labels(&self.label_selector)
            .fields("status.phase!=Terminating")
            .timeout(self.list_timeout_secs);

        let list = self.api.list(&params).await?;

        Ok(list
            .items
            .into_iter()
            .map(|ns| self.to_candidate(ns))
            .filter(|c| !c.is_terminating())
            .collect())
    }

    async fn get_namespace(&self, name: &str) -> StoreResult<Option<CandidateNamespace>> {
        let ns = self.api.get_opt(name).await?;
        Ok(ns.map(|ns| self.to_candidate(ns)))
    }

    async fn delete_namespace(&self, name: &str) -> StoreResult<()> {
        self.api.delete(name, &DeleteParams::default()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::NamespaceStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use reaper_types::NamespacePhase;
    use std::collections::BTreeMap;

    fn namespace(name: &str, phase: Option<&str>, annotations: &[(&str, &str)]) -> Namespace {
        Namespace {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                annotations: Some(
                    annotations
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect::<BTreeMap<_, _>>(),
                ),
                ..ObjectMeta::default()
            },
            status: phase.map(|p| NamespaceStatus {
                phase: Some(p.to_string()),
                ..NamespaceStatus::default()
            }),
            ..Namespace::default()
        }
    }

    #[test]
    fn test_candidate_from_namespace() {
        let ns = namespace(
            "dev-foo-issue-1",
            Some("Active"),
            &[
                (
                    "opuscapita.com/github-source-url",
                    "https://github.com/acme/foo/tree/issue-1",
                ),
                ("opuscapita.com/helm-release", "dev-foo-issue-1"),
            ],
        );

        let candidate = candidate_from_namespace(ns, &AnnotationKeys::default());
        assert_eq!(candidate.name(), "dev-foo-issue-1");
        assert_eq!(candidate.release_id(), Some("dev-foo-issue-1"));
        assert!(candidate.source_url().is_ok());
    }

    #[test]
    fn test_terminating_phase_is_carried() {
        let ns = namespace("gone", Some("Terminating"), &[]);
        let candidate = candidate_from_namespace(ns, &AnnotationKeys::default());
        assert_eq!(candidate.phase(), NamespacePhase::Terminating);
        assert!(candidate.source_url().is_err());
    }
}
