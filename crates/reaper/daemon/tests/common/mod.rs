//! In-memory collaborators for pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use reaper_daemon::config::PipelineConfig;
use reaper_daemon::error::{ReleaseResult, SourceError, SourceResult, StoreError, StoreResult};
use reaper_daemon::{
    BranchHost, BranchState, NamespaceStore, Orchestrator, ReleaseError, ReleaseManager,
    ReleaseStatus,
};
use reaper_types::{BranchRef, CandidateNamespace, NamespacePhase};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Ordered record of mutating calls across all fakes
#[derive(Debug, Default, Clone)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Candidate with both annotations set
pub fn managed(name: &str, branch: &str) -> CandidateNamespace {
    CandidateNamespace::new(name)
        .with_source_url(format!("https://github.com/acme/foo/tree/{}", branch))
        .with_release(name)
}

// ========== Namespace store ==========

#[derive(Default)]
pub struct FakeStore {
    namespaces: Mutex<BTreeMap<String, CandidateNamespace>>,
    log: CallLog,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    delete_conflicts: AtomicU32,
    fail_list: AtomicBool,
    panic_on_next_list: AtomicBool,
}

impl FakeStore {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn insert(&self, ns: CandidateNamespace) {
        self.namespaces
            .lock()
            .unwrap()
            .insert(ns.name().to_string(), ns);
    }

    pub fn remove(&self, name: &str) {
        self.namespaces.lock().unwrap().remove(name);
    }

    pub fn get(&self, name: &str) -> Option<CandidateNamespace> {
        self.namespaces.lock().unwrap().get(name).cloned()
    }

    /// Fail the next `n` deletes with a conflict
    pub fn conflict_on_delete(&self, n: u32) {
        self.delete_conflicts.store(n, Ordering::SeqCst);
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn panic_on_next_list(&self) {
        self.panic_on_next_list.store(true, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NamespaceStore for FakeStore {
    async fn list_candidates(&self) -> StoreResult<Vec<CandidateNamespace>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.panic_on_next_list.swap(false, Ordering::SeqCst) {
            panic!("store exploded");
        }
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".to_string()));
        }

        Ok(self
            .namespaces
            .lock()
            .unwrap()
            .values()
            .filter(|ns| !ns.is_terminating())
            .cloned()
            .collect())
    }

    async fn get_namespace(&self, name: &str) -> StoreResult<Option<CandidateNamespace>> {
        Ok(self.get(name))
    }

    async fn delete_namespace(&self, name: &str) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        let pending = self.delete_conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.delete_conflicts.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict(format!("namespace {} modified", name)));
        }

        let mut namespaces = self.namespaces.lock().unwrap();
        match namespaces.get_mut(name) {
            Some(ns) => {
                *ns = ns.clone().with_phase(NamespacePhase::Terminating);
                self.log.push(format!("namespace:delete:{}", name));
                Ok(())
            }
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }
}

// ========== Release manager ==========

#[derive(Default)]
pub struct FakeReleases {
    releases: Mutex<HashMap<String, ReleaseStatus>>,
    log: CallLog,
    status_calls: AtomicUsize,
    purge_calls: AtomicUsize,
    purge_error: Mutex<Option<ReleaseError>>,
    purge_conflicts: AtomicU32,
}

impl FakeReleases {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn insert(&self, name: &str, status: ReleaseStatus) {
        self.releases
            .lock()
            .unwrap()
            .insert(name.to_string(), status);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.releases.lock().unwrap().contains_key(name)
    }

    /// Every purge fails with `err`
    pub fn fail_purge(&self, err: ReleaseError) {
        *self.purge_error.lock().unwrap() = Some(err);
    }

    /// Fail the next `n` purges with a conflict
    pub fn conflict_on_purge(&self, n: u32) {
        self.purge_conflicts.store(n, Ordering::SeqCst);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn purge_calls(&self) -> usize {
        self.purge_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseManager for FakeReleases {
    async fn release_status(&self, name: &str) -> ReleaseResult<Option<ReleaseStatus>> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.releases.lock().unwrap().get(name).cloned())
    }

    async fn purge_release(&self, name: &str) -> ReleaseResult<()> {
        self.purge_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.purge_error.lock().unwrap().clone() {
            return Err(err);
        }

        let pending = self.purge_conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.purge_conflicts.store(pending - 1, Ordering::SeqCst);
            return Err(ReleaseError::Conflict(format!(
                "release {}: another operation is in progress",
                name
            )));
        }

        match self.releases.lock().unwrap().remove(name) {
            Some(_) => {
                self.log.push(format!("release:purge:{}", name));
                Ok(())
            }
            None => Err(ReleaseError::NotFound(name.to_string())),
        }
    }
}

// ========== Source-control host ==========

/// Answers 200 for every branch unless told otherwise
#[derive(Default)]
pub struct FakeBranches {
    statuses: Mutex<HashMap<String, u16>>,
    unreachable: Mutex<Vec<String>>,
    panicking: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    lookups: AtomicUsize,
}

impl FakeBranches {
    pub fn set_status(&self, branch: &str, status: u16) {
        self.statuses
            .lock()
            .unwrap()
            .insert(branch.to_string(), status);
    }

    pub fn set_unreachable(&self, branch: &str) {
        self.unreachable.lock().unwrap().push(branch.to_string());
    }

    pub fn panic_on(&self, branch: &str) {
        self.panicking.lock().unwrap().push(branch.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BranchHost for FakeBranches {
    async fn branch_state(&self, branch: &BranchRef) -> SourceResult<BranchState> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.panicking.lock().unwrap().contains(&branch.branch) {
            panic!("injected fault for {}", branch.branch);
        }
        if self.unreachable.lock().unwrap().contains(&branch.branch) {
            return Err(SourceError::InvalidApiUrl("host unreachable".to_string()));
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let status = self
            .statuses
            .lock()
            .unwrap()
            .get(&branch.branch)
            .copied()
            .unwrap_or(200);
        Ok(BranchState::from_status(status))
    }
}

// ========== Harness ==========

pub struct Harness {
    pub log: CallLog,
    pub store: Arc<FakeStore>,
    pub releases: Arc<FakeReleases>,
    pub branches: Arc<FakeBranches>,
}

impl Harness {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            store: Arc::new(FakeStore::new(log.clone())),
            releases: Arc::new(FakeReleases::new(log.clone())),
            branches: Arc::new(FakeBranches::default()),
            log,
        }
    }

    pub fn orchestrator(&self) -> Orchestrator {
        self.orchestrator_with(&PipelineConfig::default())
    }

    pub fn orchestrator_with(&self, config: &PipelineConfig) -> Orchestrator {
        Orchestrator::new(
            self.store.clone(),
            self.releases.clone(),
            self.branches.clone(),
            config,
        )
    }
}
