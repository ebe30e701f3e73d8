//! Resumable, time-bounded discovery of files living outside a protected root.
//!
//! Each call to [`DiscoveryEngine::continue_discovery`] loads the last
//! checkpoint, walks until the time budget runs out or the caller cancels,
//! and saves the checkpoint again. Once the frontier is empty the collected
//! file list is final.

pub mod engine;
pub mod enforcer;
pub mod error;
pub mod governor;
pub mod liveness;
pub mod lock_manager;
pub mod priority;
pub mod probe;
pub mod status;
pub mod traversal;

pub use engine::{DiscoveryEngine, DiscoveryOutcome, DEFAULT_SCAN_KEY};
pub use enforcer::{classify, Candidate, EntryKind, SkipReason, Verdict};
pub use error::DiscoveryError;
pub use governor::{safe_window, Budget, StepBudget, TimeBudget, Unbounded};
pub use liveness::{AlwaysRunning, CancelFlag, Liveness};
pub use lock_manager::{LockError, ScanGuard, ScanLockManager};
pub use status::{ScanStatus, StatusBoard};
pub use traversal::YieldReason;

pub use warden_policy::{HostLimits, PolicyConfig};
pub use warden_state::{DiscoveryState, Phase, StateStore};
