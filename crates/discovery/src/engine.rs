use std::path::{Path, PathBuf};
use std::time::Duration;
use warden_policy::PolicyConfig;
use warden_state::{DiscoveryState, Phase, StateStore};

use crate::error::DiscoveryError;
use crate::governor::{Budget, TimeBudget};
use crate::liveness::Liveness;
use crate::lock_manager::ScanLockManager;
use crate::priority::priority_paths;
use crate::probe::canonical_dir;
use crate::status::{ScanStatus, StatusBoard};
use crate::traversal::{seed, WalkOutcome, Walker, YieldReason};

/// Checkpoint key used when the caller does not name the scan.
pub const DEFAULT_SCAN_KEY: &str = "external_discovery";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    /// Progress was checkpointed; call again to continue.
    Yielded(YieldReason),
    /// The frontier emptied during this call.
    Completed,
    /// Nothing to do, the result was already final.
    AlreadyComplete,
    /// External discovery is switched off by policy.
    Disabled,
}

impl DiscoveryOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            DiscoveryOutcome::Completed | DiscoveryOutcome::AlreadyComplete
        )
    }
}

/// Resumable discovery of files outside a protected root.
///
/// The home root is the protected root's parent. Every call loads the
/// checkpoint from `store`, advances the walk, and saves it back.
pub struct DiscoveryEngine<S> {
    store: S,
    scan_key: String,
    protected_root: PathBuf,
    home_root: PathBuf,
    priority: Option<Vec<String>>,
    locks: ScanLockManager,
    status: StatusBoard,
}

impl<S: StateStore> DiscoveryEngine<S> {
    pub fn new(store: S, protected_root: impl AsRef<Path>) -> Result<Self, DiscoveryError> {
        let requested = protected_root.as_ref();
        let protected_root =
            canonical_dir(requested).ok_or_else(|| DiscoveryError::InvalidRoot {
                path: requested.to_path_buf(),
                reason: "not an accessible directory".to_string(),
            })?;
        let home_root = protected_root
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| DiscoveryError::InvalidRoot {
                path: protected_root.clone(),
                reason: "has no parent directory".to_string(),
            })?;

        Ok(Self {
            store,
            scan_key: DEFAULT_SCAN_KEY.to_string(),
            protected_root,
            home_root,
            priority: None,
            locks: ScanLockManager::default(),
            status: StatusBoard::new(),
        })
    }

    pub fn with_scan_key(mut self, scan_key: impl Into<String>) -> Self {
        self.scan_key = scan_key.into();
        self
    }

    /// Replace the built-in priority sub-paths (relative to the home root).
    pub fn with_priority_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.priority = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.locks = ScanLockManager::new(timeout);
        self
    }

    pub fn home_root(&self) -> &Path {
        &self.home_root
    }

    pub fn protected_root(&self) -> &Path {
        &self.protected_root
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle for pollers that want progress while a call is in flight.
    pub fn status_board(&self) -> StatusBoard {
        self.status.clone()
    }

    /// Advance discovery within the host's safe time window.
    pub fn continue_discovery(
        &self,
        policy: &PolicyConfig,
        liveness: &dyn Liveness,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let mut budget = TimeBudget::from_policy(policy);
        self.continue_discovery_with_budget(policy, liveness, &mut budget)
    }

    pub fn continue_discovery_with_budget(
        &self,
        policy: &PolicyConfig,
        liveness: &dyn Liveness,
        budget: &mut dyn Budget,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        if !policy.enabled {
            tracing::debug!("External discovery disabled by policy");
            return Ok(DiscoveryOutcome::Disabled);
        }

        let _guard = self.locks.acquire(&self.scan_key)?;
        let mut state = self.store.load_state(&self.scan_key)?;

        match state.phase {
            Phase::Complete => {
                self.status.publish(&state);
                return Ok(DiscoveryOutcome::AlreadyComplete);
            }
            Phase::NotStarted => {
                let priority = self
                    .priority
                    .clone()
                    .unwrap_or_else(|| priority_paths(policy));
                seed(
                    &mut state,
                    &self.home_root,
                    &self.protected_root,
                    &priority,
                    policy,
                );
            }
            Phase::Discovery => {
                tracing::debug!(
                    "Resuming discovery: {} dirs pending, {} files so far",
                    state.stack.len(),
                    state.collected_files.len()
                );
            }
        }

        state.invocations += 1;
        let outcome = Walker::new(&mut state, policy, &self.status).run(budget, liveness);
        state.touch();

        self.store.save_state(&self.scan_key, &state)?;
        self.status.publish(&state);

        Ok(match outcome {
            WalkOutcome::Yielded(reason) => {
                tracing::info!(
                    "Discovery checkpointed ({:?}): {} dirs pending, {} files, {} skipped",
                    reason,
                    state.stack.len(),
                    state.collected_files.len(),
                    state.skipped_count
                );
                DiscoveryOutcome::Yielded(reason)
            }
            WalkOutcome::Completed => DiscoveryOutcome::Completed,
        })
    }

    /// Current progress, live if a call is in flight, otherwise from the checkpoint.
    pub fn get_status(&self) -> Result<ScanStatus, DiscoveryError> {
        if let Some(status) = self.status.snapshot() {
            return Ok(status);
        }
        let state = self.store.load_state(&self.scan_key)?;
        Ok(ScanStatus::from_state(&state))
    }

    /// The discovered files, once discovery is complete.
    pub fn get_result(&self) -> Result<Option<Vec<String>>, DiscoveryError> {
        let state = self.store.load_state(&self.scan_key)?;
        Ok(state.is_complete().then_some(state.collected_files))
    }

    /// The result split into batches for the content-inspection stage.
    pub fn result_chunks(
        &self,
        chunk_size: usize,
    ) -> Result<Option<Vec<Vec<String>>>, DiscoveryError> {
        let chunk_size = chunk_size.max(1);
        Ok(self
            .get_result()?
            .map(|files| files.chunks(chunk_size).map(<[String]>::to_vec).collect()))
    }

    /// Discard all progress so the next call starts a new scan.
    pub fn reset(&self) -> Result<(), DiscoveryError> {
        let _guard = self.locks.acquire(&self.scan_key)?;
        self.store.reset_state(&self.scan_key)?;
        self.status.clear();
        tracing::info!("Discovery state reset for {}", self.scan_key);
        Ok(())
    }

    /// Raw checkpoint, for diagnostics.
    pub fn load_state(&self) -> Result<DiscoveryState, DiscoveryError> {
        Ok(self.store.load_state(&self.scan_key)?)
    }
}
