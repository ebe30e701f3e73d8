use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::store::{validate_key, StateStore, StoreError};
use crate::types::DiscoveryState;

/// One `<key>.json` file per scan under a base directory.
pub struct JsonFileStateStore {
    base_path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, StoreError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        tracing::info!("Checkpoint directory initialized at {:?}", base_path);
        Ok(Self { base_path })
    }

    fn state_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl StateStore for JsonFileStateStore {
    fn load_state(&self, key: &str) -> Result<DiscoveryState, StoreError> {
        let path = self.state_path(key)?;

        if !path.exists() {
            tracing::debug!("No checkpoint for {}, starting fresh", key);
            return Ok(DiscoveryState::new());
        }

        let content = fs::read_to_string(&path)?;
        let state = DiscoveryState::decode(&content)?;
        tracing::debug!("Loaded checkpoint for {}", key);
        Ok(state)
    }

    fn save_state(&self, key: &str, state: &DiscoveryState) -> Result<(), StoreError> {
        let path = self.state_path(key)?;

        // Atomic write: a crash mid-save leaves the previous checkpoint intact
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(state.encode()?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved checkpoint for {}", key);
        Ok(())
    }

    fn reset_state(&self, key: &str) -> Result<(), StoreError> {
        let path = self.state_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::info!("Deleted checkpoint for {}", key);
        }
        Ok(())
    }
}
