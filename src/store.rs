//! Durable key-value store with an in-process read-through cache.
//!
//! This is the only component that touches the persistence backend; every
//! other component operates on row arrays handed out by [`DurableStore`].
//! The layout mirrors the browser-storage model the layer emulates: one
//! key per durable table, each holding a JSON-serialized array of rows,
//! plus one key for the session record.
//!
//! Mutations run inside a per-key critical section (the cache entry lock is
//! held across read-merge-persist), so two logical operations on the same
//! table can never interleave and lose an update.
use crate::error::{MimicError, MimicResult};
use crate::types::Row;
use dashmap::DashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// The persistence surface beneath the store.
///
/// Models the flat string-to-string shape of browser local storage. A
/// backend never interprets payloads; serialization lives in
/// [`DurableStore`].
pub trait StorageBackend: Send + Sync {
    /// Read the payload under `key`, or `None` if absent.
    fn read(&self, key: &str) -> MimicResult<Option<String>>;

    /// Write `payload` under `key`, replacing any previous value.
    fn write(&self, key: &str, payload: &str) -> MimicResult<()>;

    /// Remove `key` entirely. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> MimicResult<()>;
}

/// File-per-key backend rooted at a directory.
///
/// Writes go to a temporary file first, then an atomic rename, so a crash
/// mid-write never leaves a half-written payload behind.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> MimicResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| MimicError::StorageError(format!("Failed to create directory: {}", e)))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> MimicResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MimicError::StorageError(format!(
                "Failed to read key '{}': {}",
                key, e
            ))),
        }
    }

    fn write(&self, key: &str, payload: &str) -> MimicResult<()> {
        let path = self.path_for(key);
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, payload).map_err(|e| {
            MimicError::StorageError(format!("Failed to write key '{}': {}", key, e))
        })?;

        fs::rename(&temp_path, &path).map_err(|e| {
            MimicError::StorageError(format!("Failed to rename key '{}': {}", key, e))
        })
    }

    fn remove(&self, key: &str) -> MimicResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MimicError::StorageError(format!(
                "Failed to remove key '{}': {}",
                key, e
            ))),
        }
    }
}

/// In-memory backend for tests and throwaway instances.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: DashMap<String, String>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> MimicResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn write(&self, key: &str, payload: &str) -> MimicResult<()> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> MimicResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Namespaced persistence with a per-key read-through cache.
///
/// Each key caches its row array on first read and persists synchronously
/// on every write. The store is an explicit instance passed by reference
/// (never a process-wide singleton), so tests can run isolated stores
/// side by side.
///
/// Corrupt payloads are recovered by treating the key as an empty table:
/// a warning is logged and the bad payload is overwritten on the next save.
pub struct DurableStore {
    backend: Arc<dyn StorageBackend>,
    cache: DashMap<String, Vec<Row>>,
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore")
            .field("cached_keys", &self.cache.len())
            .finish()
    }
}

impl DurableStore {
    /// Create a store over the given backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            cache: DashMap::new(),
        }
    }

    /// Create a store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Load the row array under `key`.
    ///
    /// Populates the cache from the backend on first read. Missing keys
    /// and unreadable payloads both yield an empty array; reads never fail.
    pub fn load(&self, key: &str) -> Vec<Row> {
        self.cache
            .entry(key.to_string())
            .or_insert_with(|| self.read_table(key))
            .clone()
    }

    /// Replace the row array under `key` and persist it synchronously.
    pub fn save(&self, key: &str, rows: Vec<Row>) -> MimicResult<()> {
        let payload = serde_json::to_string(&rows)?;
        self.cache.insert(key.to_string(), rows);
        self.backend.write(key, &payload)
    }

    /// Run a read-merge-persist mutation under the per-key entry lock.
    ///
    /// The closure sees the current rows and edits them in place; the
    /// result is persisted before the lock is released. This is the
    /// single-writer critical section the whole layer relies on.
    pub fn mutate<R>(&self, key: &str, f: impl FnOnce(&mut Vec<Row>) -> R) -> MimicResult<R> {
        let mut entry = self
            .cache
            .entry(key.to_string())
            .or_insert_with(|| self.read_table(key));

        let outcome = f(entry.value_mut());

        let payload = serde_json::to_string(entry.value())?;
        self.backend.write(key, &payload)?;

        Ok(outcome)
    }

    /// Drop all cached arrays, forcing the next reads back to the backend.
    ///
    /// Used by tests to simulate a process restart over the same backend.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Read a single standalone record (the session slot).
    ///
    /// Bypasses the array cache; the record is one small value and the
    /// backend read is as cheap as the cache would be.
    pub fn read_record(&self, key: &str) -> Option<Row> {
        let payload = match self.backend.read(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "backend read failed, treating record as absent");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key, error = %e, "corrupt record payload, treating as absent");
                None
            }
        }
    }

    /// Write a single standalone record.
    pub fn write_record(&self, key: &str, record: &Row) -> MimicResult<()> {
        let payload = serde_json::to_string(record)?;
        self.backend.write(key, &payload)
    }

    /// Remove a standalone record.
    pub fn clear_record(&self, key: &str) -> MimicResult<()> {
        self.backend.remove(key)
    }

    fn read_table(&self, key: &str) -> Vec<Row> {
        let payload = match self.backend.read(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(key, "no persisted payload, starting empty");
                return Vec::new();
            }
            Err(e) => {
                warn!(key, error = %e, "backend read failed, treating table as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Row>>(&payload) {
            Ok(rows) => {
                debug!(key, rows = rows.len(), "cache populated from backend");
                rows
            }
            Err(e) => {
                // Recovery policy: corrupt payloads never crash the caller.
                warn!(
                    key,
                    error = %MimicError::StorageCorruption { key: key.to_string() },
                    cause = %e,
                    "treating table as empty"
                );
                Vec::new()
            }
        }
    }
}
