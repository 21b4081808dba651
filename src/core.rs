//! Core MimicBase facade.
//!
//! This is the single entry point collaborators consume: `from(table)` for
//! data access, `auth()` for the session shim. Internals are Arc-shared, so
//! the facade clones cheaply and every clone sees the same store.
//!
//! The API shape mirrors a remote client so the mock can be swapped out for
//! a network-backed implementation without touching call sites: reads are
//! awaited, mutations return `{error}` envelopes, and nothing here panics
//! on runtime conditions.
use crate::auth::MockAuth;
use crate::error::MimicResult;
use crate::store::{DurableStore, StorageBackend};
use crate::tables::{TableHandle, TableRegistry};
use std::sync::Arc;

/// The main MimicBase instance.
///
/// # Example
///
/// ```ignore
/// use mimicbase::{MimicBase, json};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = MimicBase::start().await?;
///
///     db.from("user_progress")
///         .upsert(json!({
///             "user_id": "u1",
///             "topic_id": "t1",
///             "completion_status": "completed",
///         }))
///         .await;
///
///     let completed = db
///         .from("user_progress")
///         .select("*")
///         .eq("user_id", "u1")
///         .eq("completion_status", "completed")
///         .await;
///     println!("{} topics done", completed.rows().len());
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct MimicBase {
    store: Arc<DurableStore>,
    registry: Arc<TableRegistry>,
    auth: Arc<MockAuth>,
}

impl std::fmt::Debug for MimicBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MimicBase")
            .field("store", &self.store)
            .finish()
    }
}

impl MimicBase {
    /// Start an instance over a fresh in-memory backend.
    ///
    /// Zero configuration; state lives for the lifetime of the instance.
    pub async fn start() -> MimicResult<Self> {
        Ok(Self::with_store(Arc::new(DurableStore::in_memory())))
    }

    /// Start an instance over a caller-provided backend.
    ///
    /// Use [`crate::store::FileBackend`] for durability across restarts.
    pub async fn start_with_backend(backend: Arc<dyn StorageBackend>) -> MimicResult<Self> {
        Ok(Self::with_store(Arc::new(DurableStore::new(backend))))
    }

    fn with_store(store: Arc<DurableStore>) -> Self {
        Self {
            registry: Arc::new(TableRegistry::new()),
            auth: Arc::new(MockAuth::new(Arc::clone(&store))),
            store,
        }
    }

    /// Get a handle to a logical table.
    ///
    /// Known names resolve through the registry; unknown names pass through
    /// as durable tables keyed by the name itself.
    pub fn from(&self, table: &str) -> TableHandle {
        TableHandle::new(
            self.registry.descriptor_for(table),
            Arc::clone(&self.store),
        )
    }

    /// The auth shim.
    pub fn auth(&self) -> &MockAuth {
        &self.auth
    }

    /// Access the underlying store.
    ///
    /// Exposed for tests and tooling (e.g. dropping caches to simulate a
    /// restart over the same backend).
    pub fn store(&self) -> &Arc<DurableStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_clones_share_state() {
        let db = MimicBase::start().await.unwrap();
        let db_clone = db.clone();

        db.from("user_progress")
            .insert(json!({"user_id": "u1", "topic_id": "t1"}))
            .await;

        let rows = db_clone.from("user_progress").select("*").await.rows();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_instances_are_isolated() {
        let db_a = MimicBase::start().await.unwrap();
        let db_b = MimicBase::start().await.unwrap();

        db_a.from("weak_areas").insert(json!({"topic_id": "t1"})).await;

        assert!(db_b.from("weak_areas").select("*").await.rows().is_empty());
    }

    #[tokio::test]
    async fn test_static_catalog_readable_through_facade() {
        let db = MimicBase::start().await.unwrap();

        let paths = db.from("learning_paths").select("*").await.rows();
        assert_eq!(paths.len(), 7);
        assert!(paths[0]["modules"].is_array());
    }
}
