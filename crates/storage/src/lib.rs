//! Persistence for the quest pipeline.
//!
//! - [`DocumentStore`] trait over schemaless collections, with PostgreSQL
//!   (JSONB) and in-memory backends
//! - [`AssignmentStore`] writing `global_quests`
//! - [`RecipientEnumerator`] reading push tokens from `users`

pub mod assignments;
pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod recipients;

use std::sync::Arc;

use tracing::warn;

use usquest_core::config::StorageBackendKind;

pub use assignments::{ActiveQuests, AssignmentStore, StoredAssignment};
pub use document::{Document, DocumentStore, DocumentStream, GLOBAL_QUESTS, USERS};
pub use error::StorageError;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use recipients::RecipientEnumerator;

/// Config-selected document backend shared by the assignment and recipient views.
#[derive(Clone)]
pub struct StorageEngine {
    store: Arc<dyn DocumentStore>,
}

impl StorageEngine {
    /// Create a StorageEngine from config. Selects PostgreSQL or memory via `STORAGE_BACKEND`.
    pub async fn from_config(config: &usquest_core::Config) -> Result<Self, StorageError> {
        let store: Arc<dyn DocumentStore> = match config.storage.backend {
            StorageBackendKind::Postgres => Arc::new(PgDocumentStore::connect(&config.postgres).await?),
            StorageBackendKind::Memory => {
                warn!("Storage: in-memory backend — assignments are lost on restart");
                Arc::new(MemoryDocumentStore::new())
            }
        };
        Ok(Self { store })
    }

    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn backend_name(&self) -> &str {
        self.store.backend_name()
    }

    pub fn assignments(&self) -> AssignmentStore {
        AssignmentStore::new(self.store.clone())
    }

    pub fn recipients(&self) -> RecipientEnumerator {
        RecipientEnumerator::new(self.store.clone())
    }
}
