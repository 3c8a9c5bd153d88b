//! Core error types for mindbloom-core.
//!
//! Failures are typed at the storage and notification seams. The lifecycle
//! manager deliberately does not surface them to its callers -- it catches,
//! logs, and degrades (see `session::manager`), so these types mostly travel
//! between a collaborator and the component that logs the failure.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for mindbloom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Notification-collaborator errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// Store is locked
    #[error("Store is locked")]
    Locked,
}

/// Errors surfaced by the platform notification collaborator.
#[derive(Error, Debug)]
pub enum NotificationError {
    /// The user declined the notification permission prompt
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The requested trigger instant is not in the future
    #[error("Trigger instant {fire_at} is in the past")]
    PastTrigger {
        fire_at: chrono::DateTime<chrono::Utc>,
    },

    /// The platform refused the request
    #[error("Platform rejected the notification: {0}")]
    Rejected(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
