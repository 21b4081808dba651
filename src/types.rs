//! Common types used throughout MimicBase.
//!
//! Rows are plain JSON objects (`serde_json::Value`) so the layer can hold
//! any table shape the application invents. The structured types here cover
//! the parts that need a fixed shape: the session record, the table
//! registry entries, and the response envelopes returned to callers.
use crate::error::MimicError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single table row. Always a JSON object carrying an `id` field;
/// durable rows additionally carry `created_at` stamped at insert time.
pub type Row = JsonValue;

/// The current-user record maintained by the auth shim.
///
/// At most one session exists at a time; it is persisted under its own
/// dedicated storage key, separate from any table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque user id (matches the `user_profiles` row id)
    pub id: String,
    /// Email the user signed up with
    pub email: String,
}

impl Session {
    /// Create a new session record.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Which kind of backing a logical table has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Fixed catalog data, defined at process start, immutable.
    Static,
    /// Mutable rows persisted to the durable store, loaded lazily.
    Durable,
}

/// Registry entry describing how a logical table name is backed.
///
/// Descriptors are resolved once at startup; routing decisions read the
/// descriptor instead of branching on table-name strings at each call site.
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    /// Logical table name (e.g. "user_progress")
    pub name: String,
    /// Static catalog or durable store
    pub kind: TableKind,
    /// Storage key for durable tables ("lms_progress" etc.);
    /// unmapped tables pass the table name through unchanged
    pub storage_key: String,
    /// Default conflict key-set for upserts on this table
    pub conflict_keys: Vec<String>,
}

impl TableDescriptor {
    /// Descriptor for a static catalog table.
    pub fn static_table(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            storage_key: name.clone(),
            name,
            kind: TableKind::Static,
            conflict_keys: Vec::new(),
        }
    }

    /// Descriptor for a durable table with an explicit storage key.
    pub fn durable(name: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TableKind::Durable,
            storage_key: storage_key.into(),
            conflict_keys: Vec::new(),
        }
    }

    /// Attach the default conflict key-set used by `upsert`.
    pub fn with_conflict_keys(mut self, keys: &[&str]) -> Self {
        self.conflict_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }
}

/// Result of resolving a row-set query.
///
/// Mirrors the remote client's `{data, error}` envelope: exactly one side
/// is populated. The mock engine never fails a read, so `error` stays
/// `None` in current scope; the channel exists for a real backend.
#[derive(Debug)]
pub struct QueryResponse {
    /// Matching rows, in post-filter order
    pub data: Option<Vec<Row>>,
    /// Reserved error channel
    pub error: Option<MimicError>,
}

impl QueryResponse {
    /// Successful response carrying a row set.
    pub fn ok(rows: Vec<Row>) -> Self {
        Self {
            data: Some(rows),
            error: None,
        }
    }

    /// Unwrap the row set, defaulting to empty.
    ///
    /// Convenience for callers that treat "no data" and "zero rows" alike,
    /// which is every caller in the mock's scope.
    pub fn rows(self) -> Vec<Row> {
        self.data.unwrap_or_default()
    }
}

/// Result of a `maybe_single()` resolution.
///
/// `data: None` with `error: None` means "not found", which is an ordinary
/// outcome, not a failure.
#[derive(Debug)]
pub struct SingleResponse {
    /// First row after filtering, if any
    pub data: Option<Row>,
    /// Reserved error channel
    pub error: Option<MimicError>,
}

/// Result of an insert/update/upsert.
#[derive(Debug)]
pub struct MutationResponse {
    /// `None` on success; populated for programmer errors
    /// (read-only table, update without an id filter)
    pub error: Option<MimicError>,
    /// Rows inserted by an insert, matched by an update, or merged by an
    /// upsert. Zero matches is success (relaxed mock semantics); the count
    /// lets callers distinguish merged from appended from no-op.
    pub affected: usize,
}

impl MutationResponse {
    /// Successful mutation touching `affected` existing rows.
    pub fn ok(affected: usize) -> Self {
        Self {
            error: None,
            affected,
        }
    }

    /// Failed mutation.
    pub fn err(error: MimicError) -> Self {
        Self {
            error: Some(error),
            affected: 0,
        }
    }
}

/// Result of a sign-up or sign-in attempt.
#[derive(Debug)]
pub struct AuthResponse {
    /// `None` on success; `Validation`, `Conflict`, or
    /// `InvalidCredentials` otherwise
    pub error: Option<MimicError>,
}

impl AuthResponse {
    /// Successful auth operation.
    pub fn ok() -> Self {
        Self { error: None }
    }

    /// Failed auth operation.
    pub fn err(error: MimicError) -> Self {
        Self {
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_roundtrip() {
        let session = Session::new("user-1", "a@b.com");
        let encoded = serde_json::to_string(&session).unwrap();
        let decoded: Session = serde_json::from_str(&encoded).unwrap();
        assert_eq!(session, decoded);
    }

    #[test]
    fn test_descriptor_builders() {
        let desc = TableDescriptor::durable("user_progress", "lms_progress")
            .with_conflict_keys(&["user_id", "topic_id"]);
        assert_eq!(desc.kind, TableKind::Durable);
        assert_eq!(desc.storage_key, "lms_progress");
        assert_eq!(desc.conflict_keys, vec!["user_id", "topic_id"]);

        let fixed = TableDescriptor::static_table("topics");
        assert_eq!(fixed.kind, TableKind::Static);
        assert_eq!(fixed.storage_key, "topics");
    }

    #[test]
    fn test_query_response_rows_defaults_empty() {
        let response = QueryResponse {
            data: None,
            error: None,
        };
        assert!(response.rows().is_empty());
    }
}
