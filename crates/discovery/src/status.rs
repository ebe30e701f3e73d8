//! Progress summary for a polling UI.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use warden_state::{DiscoveryState, Phase};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStatus {
    pub phase: Phase,
    pub count: usize,
    pub skipped: u64,
    pub truncated: bool,
    pub label: String,
}

impl ScanStatus {
    pub fn from_state(state: &DiscoveryState) -> Self {
        let count = state.collected_files.len();
        let skipped = state.skipped_count;

        let label = match state.phase {
            Phase::NotStarted => "Not started".to_string(),
            Phase::Discovery => format!(
                "Discovering files outside the site root: {} found, {} skipped",
                count, skipped
            ),
            Phase::Complete => {
                let mut label = format!(
                    "Discovery complete: {} files found, {} skipped",
                    count, skipped
                );
                if state.truncated {
                    label.push_str(" (limit reached)");
                }
                label
            }
        };

        Self {
            phase: state.phase,
            count,
            skipped,
            truncated: state.truncated,
            label,
        }
    }
}

/// Latest published status, readable from other threads mid-invocation.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    latest: Arc<RwLock<Option<ScanStatus>>>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, state: &DiscoveryState) {
        *self.latest.write() = Some(ScanStatus::from_state(state));
    }

    pub fn snapshot(&self) -> Option<ScanStatus> {
        self.latest.read().clone()
    }

    pub fn clear(&self) {
        *self.latest.write() = None;
    }
}
