//! In-process document store for local development and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use uuid::Uuid;

use crate::document::{Document, DocumentStore, DocumentStream};
use crate::error::StorageError;

/// Volatile [`DocumentStore`]; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one collection in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.collections
            .read()
            .map(|c| c.get(collection).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map(|c| c.get(collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("memory store lock poisoned".into())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, body: serde_json::Value) -> Result<String, StorageError> {
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document { id: id.clone(), body });
        Ok(id)
    }

    fn stream_all<'a>(&'a self, collection: &'a str) -> DocumentStream<'a> {
        match self.collections.read() {
            Ok(collections) => {
                let snapshot = collections.get(collection).cloned().unwrap_or_default();
                stream::iter(snapshot.into_iter().map(Ok)).boxed()
            }
            Err(_) => stream::once(async { Err(poisoned()) }).boxed(),
        }
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_distinct_ids() {
        let store = MemoryDocumentStore::new();
        let a = store.insert("c", json!({"n": 1})).await.unwrap();
        let b = store.insert("c", json!({"n": 1})).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len("c"), 2);
    }

    #[tokio::test]
    async fn stream_is_a_snapshot() {
        let store = MemoryDocumentStore::new();
        store.insert("c", json!({"n": 1})).await.unwrap();

        let stream = store.stream_all("c");
        store.insert("c", json!({"n": 2})).await.unwrap();

        let docs: Vec<Document> = stream.try_collect().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].body["n"], 1);
    }

    #[tokio::test]
    async fn unknown_collection_streams_empty() {
        let store = MemoryDocumentStore::new();
        let docs: Vec<Document> = store.stream_all("nope").try_collect().await.unwrap();
        assert!(docs.is_empty());
    }
}
