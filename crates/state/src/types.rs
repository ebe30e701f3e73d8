use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::store::StoreError;

/// Checkpoint record version. Bump on any incompatible layout change.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    #[serde(rename = "none")]
    NotStarted,
    Discovery,
    Complete,
}

/// Traversal progress persisted between invocations.
///
/// Roots are fixed once the discovery phase begins; `seen` and
/// `collected_files` only grow until the record is reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub phase: Phase,
    pub home_root: String,
    pub protected_root: String,
    /// Directories pending a visit, each with a trailing separator. Top of stack is last.
    pub stack: Vec<String>,
    pub seen: BTreeSet<String>,
    pub collected_files: Vec<String>,
    pub skipped_count: u64,
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub invocations: u64,
    #[serde(default)]
    pub started_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Default for DiscoveryState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            phase: Phase::NotStarted,
            home_root: String::new(),
            protected_root: String::new(),
            stack: Vec::new(),
            seen: BTreeSet::new(),
            collected_files: Vec::new(),
            skipped_count: 0,
            truncated: false,
            invocations: 0,
            started_at: 0,
            updated_at: 0,
        }
    }
}

impl DiscoveryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the discovery phase with fixed roots and an empty frontier.
    pub fn begin(&mut self, home_root: impl Into<String>, protected_root: impl Into<String>) {
        let now = chrono::Utc::now().timestamp();
        *self = Self {
            phase: Phase::Discovery,
            home_root: home_root.into(),
            protected_root: protected_root.into(),
            started_at: now,
            updated_at: now,
            ..Default::default()
        };
    }

    pub fn complete(&mut self) {
        self.stack.clear();
        self.phase = Phase::Complete;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp();
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn validate_version(&self) -> Result<(), StoreError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(StoreError::VersionMismatch {
                found: self.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(content: &str) -> Result<Self, StoreError> {
        let state: DiscoveryState = serde_json::from_str(content)?;
        state.validate_version()?;
        Ok(state)
    }
}
