//! Cluster resource store
//!
//! Provides namespace discovery, lookup and deletion against the cluster.

mod kubernetes;
mod traits;

pub use kubernetes::KubeNamespaceStore;
pub use traits::NamespaceStore;
