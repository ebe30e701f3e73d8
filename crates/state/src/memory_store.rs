use parking_lot::Mutex;
use std::collections::HashMap;

use crate::store::{validate_key, StateStore, StoreError};
use crate::types::DiscoveryState;

/// Process-local store. Records are kept in their encoded form so a load
/// always goes through the same decode path as the durable stores.
#[derive(Default)]
pub struct MemoryStateStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn load_state(&self, key: &str) -> Result<DiscoveryState, StoreError> {
        validate_key(key)?;
        match self.records.lock().get(key) {
            Some(content) => DiscoveryState::decode(content),
            None => Ok(DiscoveryState::new()),
        }
    }

    fn save_state(&self, key: &str, state: &DiscoveryState) -> Result<(), StoreError> {
        validate_key(key)?;
        let content = state.encode()?;
        self.records.lock().insert(key.to_string(), content);
        Ok(())
    }

    fn reset_state(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.records.lock().remove(key);
        Ok(())
    }
}
