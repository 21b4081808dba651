//! # MimicBase — the embedded backend stand-in
//!
//! MimicBase emulates a remote relational backend entirely in process: a
//! multi-table store with foreign-key joins, chainable filtered queries,
//! upsert-by-composite-key, and a persisted auth session — all backed by a
//! flat durable key-value store plus an in-memory cache. It exists so an
//! application can develop and test against the exact call shapes of its
//! eventual hosted backend without a network in sight.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mimicbase::{Credentials, MimicBase, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = MimicBase::start().await?;
//!
//!     // Sign up and read the session back.
//!     db.auth().sign_up(Credentials::new("a@b.com", "secret")).await;
//!     let session = db.auth().get_session().await.unwrap();
//!
//!     // Record progress, keyed by (user, topic).
//!     db.from("user_progress")
//!         .upsert(json!({
//!             "user_id": session.id,
//!             "topic_id": "t1",
//!             "mastery_score": 80,
//!         }))
//!         .await;
//!
//!     // Chainable reads: filter, order, limit, then await.
//!     let top = db
//!         .from("user_progress")
//!         .select("*")
//!         .eq("user_id", session.id)
//!         .order("mastery_score", false)
//!         .limit(5)
//!         .await;
//!     println!("{} rows", top.rows().len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Four layers, leaves first:
//!
//! 1. **Durable store** (`store`) — namespaced key-value persistence with a
//!    per-key read-through cache; the only component touching the backend.
//! 2. **Static catalog** (`catalog`) — immutable course data with nested
//!    projections synthesized on every read.
//! 3. **Query engine** (`query`) — deferred chainable pipelines over a
//!    table snapshot, resolved on `.await` or `.maybe_single()`.
//! 4. **Router and facade** (`tables`, `core`) — descriptor-driven routing
//!    of reads and mutations, wrapped in the [`MimicBase`] entry point,
//!    with the auth shim (`auth`) alongside.
//!
//! ## Consistency model
//!
//! Single process, no real concurrency requirements: every mutation runs
//! its read-merge-persist sequence inside a per-key critical section, so
//! read-your-writes holds and interleaved logical operations cannot lose
//! updates. There is no cross-process change propagation.

// Internal modules
mod core;

// Data layer
pub mod catalog;
pub mod error;
pub mod query;
pub mod store;
pub mod tables;
pub mod types;

// Auth shim
pub mod auth;

// Public API exports
pub use crate::core::MimicBase;
pub use auth::{AuthSubscription, Credentials, MockAuth, SESSION_KEY};
pub use error::{MimicError, MimicResult};
pub use query::{FilterOp, QueryBuilder};
pub use store::{DurableStore, FileBackend, MemoryBackend, StorageBackend};
pub use tables::{RowInput, TableHandle, TableRegistry, UpdateBuilder};
pub use types::{
    AuthResponse, MutationResponse, QueryResponse, Row, Session, SingleResponse, TableDescriptor,
    TableKind,
};

// Re-export commonly used external types for convenience
pub use serde_json::{Value as JsonValue, json};

/// Install a global tracing subscriber honoring `RUST_LOG`.
///
/// Convenience for binaries and examples; call at most once per process.
/// Library code only emits spans and events and never installs a
/// subscriber on its own.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use mimicbase::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{Credentials, MockAuth};
    pub use crate::core::MimicBase;
    pub use crate::error::{MimicError, MimicResult};
    pub use crate::query::QueryBuilder;
    pub use crate::store::{DurableStore, FileBackend, MemoryBackend, StorageBackend};
    pub use crate::tables::TableHandle;
    pub use crate::types::{
        AuthResponse, MutationResponse, QueryResponse, Row, Session, SingleResponse,
    };
    pub use serde_json::{Value as JsonValue, json};
}
