//! Storage-specific error type wrapping sqlx errors.

use gather_domain::error::GatherError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to encode a value as JSON for storage.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for GatherError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
