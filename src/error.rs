//! Error types for MimicBase operations.
//!
//! All fallible operations return `Result<T, MimicError>`. The data path
//! deliberately keeps its error channel quiet (a mock backend has no network
//! to fail), but the taxonomy is complete so a real backend swap-in only
//! needs to populate it, not change call sites.
use thiserror::Error;

/// The main error type for MimicBase operations.
#[derive(Error, Debug)]
pub enum MimicError {
    /// Persisted payload for a storage key could not be parsed.
    ///
    /// Recoverable: the store treats the key as an empty table and the
    /// corrupt payload is overwritten on the next save.
    #[error("Corrupt payload under storage key '{key}'")]
    StorageCorruption {
        /// The storage key whose payload failed to parse
        key: String,
    },

    /// The durable backend failed to read or write.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Serialization error when converting data to/from JSON
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A mutation was routed to a static catalog table.
    ///
    /// Static tables are immutable for the process lifetime; this indicates
    /// a collaborator bug, surfaced through the response envelope rather
    /// than a panic.
    #[error("Table '{table}' is read-only")]
    ReadOnlyTable {
        /// The static table that was targeted
        table: String,
    },

    /// Required input was missing or malformed.
    #[error("Validation failed: {reason}")]
    Validation {
        /// Description of what was missing or malformed
        reason: String,
    },

    /// The operation conflicts with existing state (e.g. duplicate sign-up).
    #[error("Conflict: {reason}")]
    Conflict {
        /// Description of the conflicting state
        reason: String,
    },

    /// Sign-in was attempted with credentials that match no profile.
    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// Result type alias for MimicBase operations.
pub type MimicResult<T> = Result<T, MimicError>;
