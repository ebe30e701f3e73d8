use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// External "is this scan still wanted" signal.
///
/// Queried fresh at every check point; implementations must not cache.
pub trait Liveness {
    fn is_still_running(&self) -> bool;
}

impl<F> Liveness for F
where
    F: Fn() -> bool,
{
    fn is_still_running(&self) -> bool {
        self()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRunning;

impl Liveness for AlwaysRunning {
    fn is_still_running(&self) -> bool {
        true
    }
}

/// Shared cancellation flag, flipped from another thread or a signal handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Liveness for CancelFlag {
    fn is_still_running(&self) -> bool {
        !self.is_cancelled()
    }
}
