use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Environment variable carrying the host's per-invocation time ceiling, in seconds.
pub const EXECUTION_TIME_ENV: &str = "WARDEN_MAX_EXECUTION_TIME";

const DEFAULT_CEILING_SECS: u64 = 30;

/// Limits imposed by the process host on a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostLimits {
    /// Hard wall-clock ceiling per invocation. `Duration::ZERO` means unlimited.
    pub execution_time_ceiling: Duration,
}

impl HostLimits {
    pub fn new(execution_time_ceiling: Duration) -> Self {
        Self {
            execution_time_ceiling,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Read the ceiling from `WARDEN_MAX_EXECUTION_TIME`.
    ///
    /// Absent or unparsable values fall back to 30 seconds.
    pub fn from_env() -> Self {
        let secs = env::var(EXECUTION_TIME_ENV)
            .ok()
            .and_then(|v| parse_ceiling(&v))
            .unwrap_or(DEFAULT_CEILING_SECS);
        tracing::debug!("Host execution time ceiling: {}s", secs);
        Self::new(Duration::from_secs(secs))
    }

    pub fn is_unlimited(&self) -> bool {
        self.execution_time_ceiling.is_zero()
    }
}

impl Default for HostLimits {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_CEILING_SECS))
    }
}

fn parse_ceiling(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ceiling() {
        assert_eq!(parse_ceiling("60"), Some(60));
        assert_eq!(parse_ceiling(" 0 "), Some(0));
        assert_eq!(parse_ceiling("-5"), None);
        assert_eq!(parse_ceiling("abc"), None);
    }

    #[test]
    fn test_unlimited() {
        assert!(HostLimits::unlimited().is_unlimited());
        assert!(!HostLimits::default().is_unlimited());
    }
}
