//! Durable checkpoint for resumable external discovery.

pub mod file_store;
pub mod memory_store;
pub mod sqlite_store;
pub mod store;
pub mod types;

pub use file_store::JsonFileStateStore;
pub use memory_store::MemoryStateStore;
pub use sqlite_store::SqliteStateStore;
pub use store::{StateStore, StoreError};
pub use types::{DiscoveryState, Phase, SCHEMA_VERSION};
