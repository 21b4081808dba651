//! Table router: logical table names to backing rows and mutation targets.
//!
//! Routing is descriptor-driven. A [`TableRegistry`] built once at startup
//! maps each table name to a [`TableDescriptor`] (static catalog vs durable
//! store, storage key, default upsert conflict keys); every read and
//! mutation consults the descriptor instead of re-branching on name strings.
//! Names with no registered descriptor pass through as durable tables keyed
//! by the table name itself, which keeps the layer forward-compatible with
//! tables the application invents later.
use crate::catalog;
use crate::error::MimicError;
use crate::query::QueryBuilder;
use crate::store::DurableStore;
use crate::types::{MutationResponse, Row, TableDescriptor, TableKind};
use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::future::{IntoFuture, Ready, ready};
use std::sync::Arc;
use tracing::debug;

/// Name-to-descriptor registry, resolved once at startup.
#[derive(Debug)]
pub struct TableRegistry {
    descriptors: HashMap<String, TableDescriptor>,
}

impl TableRegistry {
    /// Build the registry with the built-in catalog and durable tables.
    pub fn new() -> Self {
        let entries = vec![
            TableDescriptor::static_table("learning_paths"),
            TableDescriptor::static_table("modules"),
            TableDescriptor::static_table("topics"),
            TableDescriptor::static_table("practice_problems"),
            TableDescriptor::durable("user_profiles", "lms_profiles"),
            TableDescriptor::durable("user_progress", "lms_progress")
                .with_conflict_keys(&["user_id", "topic_id"]),
            TableDescriptor::durable("user_problem_attempts", "lms_attempts"),
            TableDescriptor::durable("weak_areas", "lms_weak_areas")
                .with_conflict_keys(&["user_id", "topic_id"]),
            TableDescriptor::durable("revision_schedule", "lms_revision"),
            TableDescriptor::durable("discussion_threads", "lms_threads"),
            TableDescriptor::durable("discussion_replies", "lms_replies"),
            TableDescriptor::durable("daily_goals", "daily_goals")
                .with_conflict_keys(&["user_id", "goal_date", "goal_type", "target_id"]),
            TableDescriptor::durable("supporter_badges", "supporter_badges")
                .with_conflict_keys(&["user_id", "badge_type"]),
        ];

        Self {
            descriptors: entries
                .into_iter()
                .map(|d| (d.name.clone(), d))
                .collect(),
        }
    }

    /// Resolve a table name to its descriptor.
    ///
    /// Unmapped names get a pass-through durable descriptor whose storage
    /// key is the table name. Intentional flexibility, not an error path.
    pub fn descriptor_for(&self, table: &str) -> TableDescriptor {
        self.descriptors
            .get(table)
            .cloned()
            .unwrap_or_else(|| TableDescriptor::durable(table, table))
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One row or many; `insert` accepts both uniformly.
pub enum RowInput {
    /// A single row
    Single(Row),
    /// A batch of rows
    Many(Vec<Row>),
}

impl From<Row> for RowInput {
    fn from(row: Row) -> Self {
        Self::Single(row)
    }
}

impl From<Vec<Row>> for RowInput {
    fn from(rows: Vec<Row>) -> Self {
        Self::Many(rows)
    }
}

impl RowInput {
    fn into_vec(self) -> Vec<Row> {
        match self {
            Self::Single(row) => vec![row],
            Self::Many(rows) => rows,
        }
    }
}

/// Handle to one logical table: the object returned by `from(table)`.
///
/// Reads start with [`TableHandle::select`] and chain through the query
/// builder. Mutations (`insert`, `update`, `upsert`) are routed to the
/// durable store under the descriptor's storage key; on static tables they
/// come back with [`MimicError::ReadOnlyTable`] in the response envelope.
pub struct TableHandle {
    descriptor: TableDescriptor,
    store: Arc<DurableStore>,
}

impl TableHandle {
    pub(crate) fn new(descriptor: TableDescriptor, store: Arc<DurableStore>) -> Self {
        Self { descriptor, store }
    }

    /// Begin a read query over the current table snapshot.
    ///
    /// The column list is accepted for API-shape compatibility but not
    /// enforced; the mock always returns whole rows.
    pub fn select(&self, _columns: &str) -> QueryBuilder {
        QueryBuilder::new(self.snapshot())
    }

    /// Insert one row or a batch.
    ///
    /// Rows lacking an `id` get a generated one (table prefix, millisecond
    /// timestamp, random suffix); every row is stamped with `created_at`.
    /// `affected` reports the number of rows inserted.
    pub async fn insert(&self, rows: impl Into<RowInput>) -> MutationResponse {
        if self.descriptor.kind == TableKind::Static {
            return MutationResponse::err(MimicError::ReadOnlyTable {
                table: self.descriptor.name.clone(),
            });
        }

        let mut incoming = rows.into().into_vec();
        let inserted = incoming.len();
        let now = Utc::now().to_rfc3339();
        for row in &mut incoming {
            if let Some(fields) = row.as_object_mut() {
                if !fields.contains_key("id") {
                    fields.insert(
                        "id".to_string(),
                        JsonValue::from(generate_row_id(&self.descriptor.name)),
                    );
                }
                fields.insert("created_at".to_string(), JsonValue::from(now.clone()));
            }
        }

        debug!(table = %self.descriptor.name, rows = inserted, "insert");
        let result = self
            .store
            .mutate(&self.descriptor.storage_key, |existing| {
                existing.extend(incoming);
            });

        match result {
            Ok(()) => MutationResponse::ok(inserted),
            Err(e) => MutationResponse::err(e),
        }
    }

    /// Begin an update of the fields in `partial`.
    ///
    /// The returned builder requires exactly one `.eq("id", value)` before
    /// it is awaited; resolution shallow-merges `partial` onto the matching
    /// row. No match is a silent no-op with `affected == 0`.
    pub fn update(&self, partial: Row) -> UpdateBuilder {
        UpdateBuilder {
            descriptor: self.descriptor.clone(),
            store: Arc::clone(&self.store),
            partial,
            target_id: None,
        }
    }

    /// Upsert using the table's default conflict key-set.
    ///
    /// Tables without a registered key-set fall back to matching on `id`.
    pub async fn upsert(&self, row: Row) -> MutationResponse {
        let keys: Vec<&str> = if self.descriptor.conflict_keys.is_empty() {
            vec!["id"]
        } else {
            self.descriptor
                .conflict_keys
                .iter()
                .map(String::as_str)
                .collect()
        };
        self.upsert_on_conflict(row, &keys).await
    }

    /// Upsert with an explicit conflict key-set.
    ///
    /// Finds an existing row whose values at all `conflict_keys` fields
    /// equal the candidate's; merges if found (`affected == 1`), otherwise
    /// assigns an id if absent and appends (`affected == 0`). Idempotent
    /// under repeated calls with the same key values.
    pub async fn upsert_on_conflict(&self, row: Row, conflict_keys: &[&str]) -> MutationResponse {
        if self.descriptor.kind == TableKind::Static {
            return MutationResponse::err(MimicError::ReadOnlyTable {
                table: self.descriptor.name.clone(),
            });
        }

        debug!(table = %self.descriptor.name, keys = ?conflict_keys, "upsert");
        let table = &self.descriptor.name;
        let result = self
            .store
            .mutate(&self.descriptor.storage_key, |existing| {
                let matched = existing.iter_mut().find(|candidate| {
                    conflict_keys
                        .iter()
                        .all(|key| candidate.get(*key) == row.get(*key))
                });

                match matched {
                    // The merge keeps the existing row's identity: ids are
                    // assigned on the append branch only.
                    Some(target) => {
                        merge_into(target, &row);
                        1
                    }
                    None => {
                        let mut row = row;
                        if let Some(fields) = row.as_object_mut() {
                            if !fields.contains_key("id") {
                                fields.insert(
                                    "id".to_string(),
                                    JsonValue::from(generate_row_id(table)),
                                );
                            }
                        }
                        existing.push(row);
                        0
                    }
                }
            });

        match result {
            Ok(affected) => MutationResponse::ok(affected),
            Err(e) => MutationResponse::err(e),
        }
    }

    fn snapshot(&self) -> Vec<Row> {
        match self.descriptor.kind {
            TableKind::Static => {
                catalog::static_rows(&self.descriptor.name).unwrap_or_default()
            }
            TableKind::Durable => self.store.load(&self.descriptor.storage_key),
        }
    }
}

/// Pending update awaiting its id filter.
///
/// Only `eq("id", value)` selects a target; other columns are accepted and
/// ignored, matching the reference contract. Awaiting without an id filter
/// resolves to a `Validation` error rather than guessing.
pub struct UpdateBuilder {
    descriptor: TableDescriptor,
    store: Arc<DurableStore>,
    partial: Row,
    target_id: Option<JsonValue>,
}

impl UpdateBuilder {
    /// Filter the update target. Only the `id` column selects a row.
    pub fn eq(mut self, column: impl AsRef<str>, value: impl Into<JsonValue>) -> Self {
        if column.as_ref() == "id" {
            self.target_id = Some(value.into());
        }
        self
    }

    fn resolve(self) -> MutationResponse {
        if self.descriptor.kind == TableKind::Static {
            return MutationResponse::err(MimicError::ReadOnlyTable {
                table: self.descriptor.name,
            });
        }

        let Some(target_id) = self.target_id else {
            return MutationResponse::err(MimicError::Validation {
                reason: "update requires an eq(\"id\", ...) filter".to_string(),
            });
        };

        debug!(table = %self.descriptor.name, "update");
        let result = self.store.mutate(&self.descriptor.storage_key, |rows| {
            match rows.iter_mut().find(|row| row.get("id") == Some(&target_id)) {
                Some(target) => {
                    merge_into(target, &self.partial);
                    1
                }
                None => 0,
            }
        });

        match result {
            Ok(affected) => MutationResponse::ok(affected),
            Err(e) => MutationResponse::err(e),
        }
    }
}

impl IntoFuture for UpdateBuilder {
    type Output = MutationResponse;
    type IntoFuture = Ready<MutationResponse>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self.resolve())
    }
}

/// Shallow-merge the fields of `patch` onto `target`.
fn merge_into(target: &mut Row, patch: &Row) {
    if let (Some(fields), Some(updates)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in updates {
            fields.insert(key.clone(), value.clone());
        }
    }
}

/// Generate a row id: short table prefix, millisecond timestamp, random
/// alphanumeric suffix. Collisions need the same table, the same
/// millisecond, and a 62^8 suffix clash.
fn generate_row_id(table: &str) -> String {
    let prefix: String = table.chars().take(2).collect();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn durable_handle(table: &str) -> (TableHandle, Arc<DurableStore>) {
        let store = Arc::new(DurableStore::in_memory());
        let registry = TableRegistry::new();
        let handle = TableHandle::new(registry.descriptor_for(table), Arc::clone(&store));
        (handle, store)
    }

    #[test]
    fn test_registry_known_and_passthrough() {
        let registry = TableRegistry::new();

        let progress = registry.descriptor_for("user_progress");
        assert_eq!(progress.kind, TableKind::Durable);
        assert_eq!(progress.storage_key, "lms_progress");
        assert_eq!(progress.conflict_keys, vec!["user_id", "topic_id"]);

        let paths = registry.descriptor_for("learning_paths");
        assert_eq!(paths.kind, TableKind::Static);

        // Unmapped names pass through as durable tables keyed by name.
        let cohorts = registry.descriptor_for("cohorts");
        assert_eq!(cohorts.kind, TableKind::Durable);
        assert_eq!(cohorts.storage_key, "cohorts");
        assert!(cohorts.conflict_keys.is_empty());
    }

    #[tokio::test]
    async fn test_insert_generates_id_and_created_at() {
        let (handle, _) = durable_handle("user_progress");

        let response = handle.insert(json!({"user_id": "u1", "topic_id": "t1"})).await;
        assert!(response.error.is_none());
        assert_eq!(response.affected, 1);

        let rows = handle.select("*").await.rows();
        assert_eq!(rows.len(), 1);
        assert!(rows[0]["id"].as_str().unwrap().starts_with("us_"));
        assert!(rows[0]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_insert_batch_and_single_uniformly() {
        let (handle, _) = durable_handle("discussion_replies");

        handle.insert(json!({"body": "first"})).await;
        handle
            .insert(vec![json!({"body": "second"}), json!({"body": "third"})])
            .await;

        assert_eq!(handle.select("*").await.rows().len(), 3);
    }

    #[tokio::test]
    async fn test_insert_keeps_explicit_id() {
        let (handle, _) = durable_handle("discussion_threads");

        handle.insert(json!({"id": "thread-1", "title": "hello"})).await;
        let rows = handle.select("*").await.rows();
        assert_eq!(rows[0]["id"], "thread-1");
    }

    #[tokio::test]
    async fn test_insert_id_uniqueness_at_scale() {
        let (handle, _) = durable_handle("user_problem_attempts");

        let batch: Vec<Row> = (0..1000).map(|i| json!({"n": i})).collect();
        handle.insert(batch).await;

        let ids: HashSet<String> = handle
            .select("*")
            .await
            .rows()
            .iter()
            .map(|r| r["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids.len(), 1000);
    }

    #[tokio::test]
    async fn test_update_merges_by_id() {
        let (handle, _) = durable_handle("user_progress");
        handle
            .insert(json!({"id": "row-1", "status": "in_progress", "score": 10}))
            .await;

        let response = handle
            .update(json!({"status": "completed"}))
            .eq("id", "row-1")
            .await;
        assert!(response.error.is_none());
        assert_eq!(response.affected, 1);

        let row = handle
            .select("*")
            .eq("id", "row-1")
            .maybe_single()
            .await
            .data
            .unwrap();
        assert_eq!(row["status"], "completed");
        assert_eq!(row["score"], 10);
    }

    #[tokio::test]
    async fn test_update_no_match_is_silent_noop() {
        let (handle, _) = durable_handle("user_progress");

        let response = handle
            .update(json!({"status": "completed"}))
            .eq("id", "missing")
            .await;
        assert!(response.error.is_none());
        assert_eq!(response.affected, 0);
    }

    #[tokio::test]
    async fn test_update_without_id_filter_is_rejected() {
        let (handle, _) = durable_handle("user_progress");

        let response = handle.update(json!({"status": "completed"})).await;
        assert!(matches!(
            response.error,
            Some(MimicError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_upsert_idempotent_on_conflict_keys() {
        let (handle, _) = durable_handle("user_progress");

        handle
            .upsert(json!({"user_id": "u1", "topic_id": "t1", "mastery_score": 40}))
            .await;
        let second = handle
            .upsert(json!({"user_id": "u1", "topic_id": "t1", "mastery_score": 75}))
            .await;
        assert_eq!(second.affected, 1);

        let rows = handle
            .select("*")
            .eq("user_id", "u1")
            .eq("topic_id", "t1")
            .await
            .rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["mastery_score"], 75);
    }

    #[tokio::test]
    async fn test_upsert_merge_preserves_row_id() {
        let (handle, _) = durable_handle("user_progress");

        handle
            .upsert(json!({"user_id": "u1", "topic_id": "t1", "mastery_score": 40}))
            .await;
        let original_id = handle.select("*").await.rows()[0]["id"].clone();

        handle
            .upsert(json!({"user_id": "u1", "topic_id": "t1", "mastery_score": 75}))
            .await;

        // The merged row keeps its identity, so an id stored by a caller
        // before the second upsert still addresses it.
        let rows = handle.select("*").await.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], original_id);

        let updated = handle
            .update(json!({"mastery_score": 90}))
            .eq("id", original_id)
            .await;
        assert_eq!(updated.affected, 1);
    }

    #[tokio::test]
    async fn test_upsert_appends_when_keys_differ() {
        let (handle, _) = durable_handle("user_progress");

        handle
            .upsert(json!({"user_id": "u1", "topic_id": "t1", "mastery_score": 40}))
            .await;
        let appended = handle
            .upsert(json!({"user_id": "u1", "topic_id": "t2", "mastery_score": 10}))
            .await;
        assert_eq!(appended.affected, 0);

        assert_eq!(handle.select("*").await.rows().len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_composite_conflict_keys() {
        let (handle, _) = durable_handle("daily_goals");
        let goal = json!({
            "user_id": "u1",
            "goal_date": "2026-08-28",
            "goal_type": "solve_problems",
            "target_id": null,
            "target_value": 3,
        });

        handle.upsert(goal.clone()).await;
        let mut bumped = goal;
        bumped["target_value"] = json!(5);
        handle.upsert(bumped).await;

        let rows = handle.select("*").await.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["target_value"], 5);
    }

    #[tokio::test]
    async fn test_mutations_rejected_on_static_tables() {
        let store = Arc::new(DurableStore::in_memory());
        let registry = TableRegistry::new();
        let handle = TableHandle::new(registry.descriptor_for("topics"), store);

        let insert = handle.insert(json!({"title": "new topic"})).await;
        assert!(matches!(
            insert.error,
            Some(MimicError::ReadOnlyTable { .. })
        ));

        let upsert = handle.upsert(json!({"id": "t1"})).await;
        assert!(matches!(
            upsert.error,
            Some(MimicError::ReadOnlyTable { .. })
        ));

        let update = handle.update(json!({"title": "x"})).eq("id", "t1").await;
        assert!(matches!(
            update.error,
            Some(MimicError::ReadOnlyTable { .. })
        ));
    }

    #[tokio::test]
    async fn test_mutation_persists_through_store() {
        let (handle, store) = durable_handle("weak_areas");

        handle
            .upsert(json!({"user_id": "u1", "topic_id": "t3", "severity": "high"}))
            .await;

        // Survives a simulated restart over the same backend.
        store.clear_cache();
        let rows = handle.select("*").await.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["severity"], "high");
    }
}
