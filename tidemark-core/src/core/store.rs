//! Key-value persistence for note collections.
//!
//! Collections are stored whole: one key per video, one JSON array per key.
//! The [`NoteStore`] trait is the seam that lets the session run against the
//! bundled SQLite backend, the in-memory backend, or an embedder's own.

use log::debug;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::Result;

/// Storage key for a video's note collection.
pub fn storage_key(video_id: &str) -> String {
    format!("notes_{video_id}")
}

/// Whole-value key-value storage for serialized note collections.
pub trait NoteStore: Send {
    /// Reads the raw value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read. A missing key is
    /// `Ok(None)`, never an error.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend rejects the write.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// SQLite-backed note store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens the note database at `path`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TidemarkError::Storage`] if the file cannot be
    /// opened or is not a SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(&path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        debug!("opened note database at {}", path.as_ref().display());
        Ok(Self { conn })
    }
}

impl NoteStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT payload FROM note_collections WHERE storage_key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(payload) => Ok(Some(payload)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO note_collections (storage_key, payload) VALUES (?1, ?2)",
            [key, value],
        )?;
        Ok(())
    }
}

/// In-memory note store for tests and ephemeral embedders.
///
/// Clones share the same underlying map, so a test can keep a handle while
/// the session owns another and observe what was written.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entries: HashMap<String, String>,
    write_count: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the value stored under `key`, if any.
    #[must_use]
    pub fn snapshot(&self, key: &str) -> Option<String> {
        self.locked().entries.get(key).cloned()
    }

    /// Total number of writes performed, for asserting no-op behavior.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.locked().write_count
    }

    // A poisoned lock only means another holder panicked; the map itself
    // is still consistent.
    fn locked(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NoteStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.snapshot(key))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let mut inner = self.locked();
        inner.write_count += 1;
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
