use std::sync::Arc;
use thiserror::Error;

use crate::types::DiscoveryState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Checkpoint schema version {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("Invalid state key: {0:?}")]
    InvalidKey(String),
}

/// Durable key-value persistence for discovery checkpoints.
///
/// Loading a key that was never saved yields a fresh, not-started state.
pub trait StateStore: Send + Sync {
    fn load_state(&self, key: &str) -> Result<DiscoveryState, StoreError>;

    fn save_state(&self, key: &str, state: &DiscoveryState) -> Result<(), StoreError>;

    /// Discard the checkpoint entirely.
    fn reset_state(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    fn load_state(&self, key: &str) -> Result<DiscoveryState, StoreError> {
        (**self).load_state(key)
    }

    fn save_state(&self, key: &str, state: &DiscoveryState) -> Result<(), StoreError> {
        (**self).save_state(key, state)
    }

    fn reset_state(&self, key: &str) -> Result<(), StoreError> {
        (**self).reset_state(key)
    }
}

pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() || key.contains("..") || key.contains('/') || key.contains('\\') {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
