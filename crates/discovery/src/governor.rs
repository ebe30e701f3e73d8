//! Decides when an invocation must stop walking and checkpoint.

use std::time::{Duration, Instant};
use warden_policy::PolicyConfig;

/// Reserved for saving the checkpoint before the host kills the invocation.
pub const SAFETY_MARGIN: Duration = Duration::from_secs(5);

/// Working slice used when the host imposes no ceiling, so checkpoints still happen.
pub const UNLIMITED_SLICE: Duration = Duration::from_secs(25);

const MIN_WINDOW: Duration = Duration::from_secs(1);

/// Time available for walking: the ceiling minus the safety margin, at least one second.
pub fn safe_window(ceiling: Duration) -> Duration {
    if ceiling.is_zero() {
        return UNLIMITED_SLICE;
    }
    ceiling.saturating_sub(SAFETY_MARGIN).max(MIN_WINDOW)
}

/// Consulted before each unit of work.
pub trait Budget {
    fn exhausted(&mut self) -> bool;
}

/// Wall-clock budget measured from the start of the invocation.
#[derive(Debug, Clone)]
pub struct TimeBudget {
    started: Instant,
    window: Duration,
}

impl TimeBudget {
    pub fn new(window: Duration) -> Self {
        Self::starting_at(Instant::now(), window)
    }

    pub fn starting_at(started: Instant, window: Duration) -> Self {
        Self { started, window }
    }

    pub fn from_policy(policy: &PolicyConfig) -> Self {
        Self::new(safe_window(policy.execution_time_ceiling))
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Budget for TimeBudget {
    fn exhausted(&mut self) -> bool {
        self.elapsed() >= self.window
    }
}

/// Never runs out. For one-shot runs where the caller owns the deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Budget for Unbounded {
    fn exhausted(&mut self) -> bool {
        false
    }
}

/// Allows a fixed number of checks, then reports exhaustion.
///
/// Gives deterministic slicing of a run independent of machine speed.
#[derive(Debug, Clone, Copy)]
pub struct StepBudget {
    remaining: usize,
}

impl StepBudget {
    pub fn new(steps: usize) -> Self {
        Self { remaining: steps }
    }
}

impl Budget for StepBudget {
    fn exhausted(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_window_subtracts_margin() {
        assert_eq!(safe_window(Duration::from_secs(30)), Duration::from_secs(25));
        assert_eq!(safe_window(Duration::from_secs(120)), Duration::from_secs(115));
    }

    #[test]
    fn test_safe_window_floor() {
        assert_eq!(safe_window(Duration::from_secs(3)), Duration::from_secs(1));
    }

    #[test]
    fn test_safe_window_unlimited() {
        assert_eq!(safe_window(Duration::ZERO), UNLIMITED_SLICE);
    }

    #[test]
    fn test_time_budget_exhaustion() {
        let mut expired = TimeBudget::starting_at(Instant::now(), Duration::ZERO);
        let mut fresh = TimeBudget::new(Duration::from_secs(60));

        assert!(expired.exhausted());
        assert!(!fresh.exhausted());
    }

    #[test]
    fn test_step_budget() {
        let mut budget = StepBudget::new(2);
        assert!(!budget.exhausted());
        assert!(!budget.exhausted());
        assert!(budget.exhausted());
        assert!(budget.exhausted());
    }

    #[test]
    fn test_unbounded() {
        let mut budget = Unbounded;
        assert!((0..1000).all(|_| !budget.exhausted()));
    }
}
