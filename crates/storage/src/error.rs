use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend unreachable, not configured, or failed mid-operation.
    #[error("persistence unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StorageError::Unavailable(format!("migrations not applied: {e}"))
    }
}
