//! Per-scan mutual exclusion.
//!
//! At most one invocation may mutate a scan's checkpoint at a time. A second
//! trigger for the same scan waits up to the timeout for the running one to
//! checkpoint, then gives up. A zero timeout fails immediately.

use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("Scan is already running: {0}")]
    Busy(String),
}

/// Scan keys currently being advanced, with the time each one started.
#[derive(Default)]
struct ActiveScans {
    running: Mutex<HashMap<String, Instant>>,
    released: Condvar,
}

#[derive(Clone)]
pub struct ScanLockManager {
    active: Arc<ActiveScans>,
    timeout: Duration,
}

impl ScanLockManager {
    pub fn new(timeout: Duration) -> Self {
        Self {
            active: Arc::new(ActiveScans::default()),
            timeout,
        }
    }

    pub fn acquire(&self, scan_key: &str) -> Result<ScanGuard, LockError> {
        let deadline = Instant::now() + self.timeout;
        let mut running = self.active.running.lock();

        while let Some(held_for) = running.get(scan_key).map(|started| started.elapsed()) {
            if Instant::now() >= deadline {
                tracing::debug!("Scan {} busy, held for {:?}", scan_key, held_for);
                return Err(LockError::Busy(scan_key.to_string()));
            }
            self.active.released.wait_until(&mut running, deadline);
        }

        running.insert(scan_key.to_string(), Instant::now());
        Ok(ScanGuard {
            active: Arc::clone(&self.active),
            scan_key: scan_key.to_string(),
        })
    }

    /// Number of scans currently holding the lock.
    pub fn running(&self) -> usize {
        self.active.running.lock().len()
    }
}

impl Default for ScanLockManager {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

/// Held for the duration of one invocation; released on drop.
pub struct ScanGuard {
    active: Arc<ActiveScans>,
    scan_key: String,
}

impl ScanGuard {
    pub fn scan_key(&self) -> &str {
        &self.scan_key
    }
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.active.running.lock().remove(&self.scan_key);
        self.active.released.notify_all();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_release_evicts_scan() {
        let manager = ScanLockManager::new(Duration::from_secs(5));

        let guard = manager.acquire("external").unwrap();
        assert_eq!(guard.scan_key(), "external");
        assert_eq!(manager.running(), 1);
        drop(guard);

        assert_eq!(manager.running(), 0);
        assert!(manager.acquire("external").is_ok());
    }

    #[test]
    fn test_zero_timeout_fails_fast() {
        let manager = ScanLockManager::new(Duration::ZERO);
        let _guard = manager.acquire("external").unwrap();

        let start = Instant::now();
        assert!(matches!(
            manager.acquire("external"),
            Err(LockError::Busy(_))
        ));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_second_trigger_waits_then_busy() {
        let manager = ScanLockManager::new(Duration::from_millis(50));
        let _guard = manager.acquire("external").unwrap();

        let start = Instant::now();
        let result = manager.acquire("external");

        assert!(matches!(result, Err(LockError::Busy(_))));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_waiter_gets_lock_after_release() {
        let manager = ScanLockManager::new(Duration::from_secs(5));
        let guard = manager.acquire("external").unwrap();

        let waiter = manager.clone();
        let handle = thread::spawn(move || waiter.acquire("external").is_ok());

        thread::sleep(Duration::from_millis(50));
        drop(guard);

        assert!(handle.join().unwrap());
        assert_eq!(manager.running(), 0);
    }

    #[test]
    fn test_different_scans_independent() {
        let manager = ScanLockManager::new(Duration::ZERO);
        let _a = manager.acquire("scan_a").unwrap();
        assert!(manager.acquire("scan_b").is_ok());
        assert_eq!(manager.running(), 1);
    }
}
