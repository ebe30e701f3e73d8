use std::path::PathBuf;
use thiserror::Error;
use warden_state::StoreError;

use crate::lock_manager::LockError;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Checkpoint error: {0}")]
    Store(#[from] StoreError),

    #[error("Lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Invalid protected root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },
}
