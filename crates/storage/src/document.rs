//! Document store abstraction: append-only inserts and full-collection streams.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::StorageError;

/// Collection holding one document per quest assignment.
pub const GLOBAL_QUESTS: &str = "global_quests";

/// Collection of user profiles (read-only for this service).
pub const USERS: &str = "users";

/// A stored document: backend-assigned id plus its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: serde_json::Value,
}

/// Lazy, finite, non-restartable sequence of documents.
pub type DocumentStream<'a> = BoxStream<'a, Result<Document, StorageError>>;

/// Persistence backend capabilities consumed by the quest pipeline.
///
/// Both operations may fail with [`StorageError::Unavailable`] when the
/// backend cannot be reached; callers treat that uniformly.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append `body` to `collection` and return the fresh document id.
    async fn insert(&self, collection: &str, body: serde_json::Value) -> Result<String, StorageError>;

    /// Stream every document of `collection` as of the time of the call.
    ///
    /// Connectivity failures surface as the first item of the stream.
    fn stream_all<'a>(&'a self, collection: &'a str) -> DocumentStream<'a>;

    /// Short backend name for logs and health output (e.g. "postgres").
    fn backend_name(&self) -> &str;
}
