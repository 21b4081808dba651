//! Deferred, chainable query evaluation over a table snapshot.
//!
//! A query accumulates filter descriptors and resolves exactly once, either
//! by being awaited (yielding a row set) or through [`QueryBuilder::maybe_single`]
//! (yielding the first row or `None`). Each operator is a pure
//! `Vec<Row> -> Vec<Row>` reducer keyed by a tag, so new operators can be
//! added without touching the resolution contract.
//!
//! Operators execute strictly in accumulation order. Conjunctive filters
//! (`eq`, `is`, `lte`) commute among themselves, but `order` and `limit` do
//! not commute with anything: callers wanting conventional SQL semantics
//! chain filters first, then `order`, then `limit`.
//!
//! # Example
//!
//! ```ignore
//! let response = db
//!     .from("user_progress")
//!     .select("*")
//!     .eq("user_id", "u1")
//!     .order("mastery_score", false)
//!     .limit(5)
//!     .await;
//! ```
use crate::types::{QueryResponse, Row, SingleResponse};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::future::{IntoFuture, Ready, ready};

/// A single operation in a query pipeline.
#[derive(Debug, Clone)]
pub enum FilterOp {
    /// Keep rows where the column strictly equals the value (no coercion).
    Eq { column: String, value: JsonValue },
    /// Identical to `Eq`; models SQL `IS` for null checks. Kept as a
    /// distinct tag so a real backend can diverge without an API change.
    Is { column: String, value: JsonValue },
    /// Keep rows where the column is less than or equal to the value.
    /// Numbers compare by value, strings lexicographically (ISO timestamps
    /// order correctly); rows with missing or incomparable columns drop.
    Lte { column: String, value: JsonValue },
    /// Stable sort by a column. Ties keep their prior relative order;
    /// rows missing the column sort last.
    Order { column: String, ascending: bool },
    /// Truncate to the first `n` rows of whatever precedes this op.
    Limit(usize),
}

impl FilterOp {
    /// Apply this operation to a row set, producing the next row set.
    pub fn apply(&self, mut rows: Vec<Row>) -> Vec<Row> {
        match self {
            FilterOp::Eq { column, value } | FilterOp::Is { column, value } => {
                rows.retain(|row| row.get(column.as_str()) == Some(value));
                rows
            }
            FilterOp::Lte { column, value } => {
                rows.retain(|row| {
                    row.get(column.as_str()).is_some_and(|v| {
                        matches!(
                            compare_json(v, value),
                            Some(Ordering::Less | Ordering::Equal)
                        )
                    })
                });
                rows
            }
            FilterOp::Order { column, ascending } => {
                // Only present-present comparisons flip with direction;
                // rows missing the column sort last either way.
                rows.sort_by(|a, b| match (a.get(column.as_str()), b.get(column.as_str())) {
                    (Some(av), Some(bv)) => {
                        let cmp = compare_json(av, bv).unwrap_or(Ordering::Equal);
                        if *ascending { cmp } else { cmp.reverse() }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                });
                rows
            }
            FilterOp::Limit(n) => {
                rows.truncate(*n);
                rows
            }
        }
    }
}

/// A deferred query bound to one table snapshot.
///
/// The builder is immutable in use: every chain call consumes the builder
/// and returns a new one with the operation appended, so a caller can hold
/// a partially-built query and branch from it without aliasing surprises.
///
/// Resolution happens on `.await` (row set) or `.maybe_single().await`
/// (first row or `None`). The error channel of both envelopes stays empty
/// in the mock; it exists so a network-backed engine can slot in.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    rows: Vec<Row>,
    ops: Vec<FilterOp>,
}

impl QueryBuilder {
    /// Create a query over a snapshot of rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ops: Vec::new(),
        }
    }

    /// Column selection, accepted anywhere in the chain.
    ///
    /// A data-level no-op kept for API-shape compatibility; the engine
    /// always returns whole rows.
    pub fn select(self, _columns: &str) -> Self {
        self
    }

    /// Keep rows where `column` strictly equals `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.ops.push(FilterOp::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// SQL `IS` comparison; behaves exactly like [`QueryBuilder::eq`].
    pub fn is(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.ops.push(FilterOp::Is {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Keep rows where `column` is less than or equal to `value`.
    pub fn lte(mut self, column: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.ops.push(FilterOp::Lte {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Stable sort by `column`, ascending or descending.
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.ops.push(FilterOp::Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Truncate the result to the first `n` rows.
    pub fn limit(mut self, n: usize) -> Self {
        self.ops.push(FilterOp::Limit(n));
        self
    }

    /// Run the accumulated pipeline against the snapshot.
    pub fn resolve(self) -> Vec<Row> {
        self.ops
            .iter()
            .fold(self.rows, |rows, op| op.apply(rows))
    }

    /// Resolve to the first matching row, or `None`.
    ///
    /// Absence is an ordinary outcome: `data` is `None` and `error` stays
    /// `None` too.
    pub async fn maybe_single(self) -> SingleResponse {
        let mut rows = self.resolve();
        let first = if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        };
        SingleResponse {
            data: first,
            error: None,
        }
    }
}

impl IntoFuture for QueryBuilder {
    type Output = QueryResponse;
    type IntoFuture = Ready<QueryResponse>;

    /// Awaiting a builder resolves it. The future is always ready; the
    /// async shape exists for substitutability with a real remote client.
    fn into_future(self) -> Self::IntoFuture {
        ready(QueryResponse::ok(self.resolve()))
    }
}

/// Compare two JSON scalars. Nulls sort before everything; values of
/// different types are incomparable.
fn compare_json(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Null, JsonValue::Null) => Some(Ordering::Equal),
        (JsonValue::Null, _) => Some(Ordering::Less),
        (_, JsonValue::Null) => Some(Ordering::Greater),
        (JsonValue::Number(a), JsonValue::Number(b)) => {
            let a_f = a.as_f64()?;
            let b_f = b.as_f64()?;
            a_f.partial_cmp(&b_f)
        }
        (JsonValue::String(a), JsonValue::String(b)) => Some(a.cmp(b)),
        (JsonValue::Bool(a), JsonValue::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
