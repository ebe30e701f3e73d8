use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::store::{validate_key, StateStore, StoreError};
use crate::types::DiscoveryState;

/// Checkpoints stored as rows of a key-value table.
pub struct SqliteStateStore {
    conn: Mutex<Connection>,
}

impl SqliteStateStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS scan_state (
                key TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl StateStore for SqliteStateStore {
    fn load_state(&self, key: &str) -> Result<DiscoveryState, StoreError> {
        validate_key(key)?;
        let conn = self.conn.lock();

        let content: Option<String> = conn
            .query_row(
                "SELECT content FROM scan_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match content {
            Some(content) => {
                tracing::debug!("Loaded checkpoint for {}", key);
                DiscoveryState::decode(&content)
            }
            None => Ok(DiscoveryState::new()),
        }
    }

    fn save_state(&self, key: &str, state: &DiscoveryState) -> Result<(), StoreError> {
        validate_key(key)?;
        let content = state.encode()?;
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO scan_state (key, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(key) DO UPDATE SET content = excluded.content, updated_at = excluded.updated_at",
            params![key, content, now],
        )?;

        tracing::debug!("Saved checkpoint for {}", key);
        Ok(())
    }

    fn reset_state(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM scan_state WHERE key = ?1", params![key])?;
        if removed > 0 {
            tracing::info!("Deleted checkpoint for {}", key);
        }
        Ok(())
    }
}
