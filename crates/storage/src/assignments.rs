//! Append-only persistence of quest assignments.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::Serialize;
use tracing::{info, warn};

use usquest_core::{AssignmentRecord, Frequency, QuestDefinition};

use crate::document::{DocumentStore, GLOBAL_QUESTS};
use crate::error::StorageError;

/// An assignment together with the id the backend gave it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredAssignment {
    pub id: String,
    #[serde(flatten)]
    pub record: AssignmentRecord,
}

/// Newest assignment of each class.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActiveQuests {
    pub daily: Option<StoredAssignment>,
    pub weekly: Option<StoredAssignment>,
}

impl ActiveQuests {
    fn slot(&mut self, frequency: Frequency) -> &mut Option<StoredAssignment> {
        match frequency {
            Frequency::Daily => &mut self.daily,
            Frequency::Weekly => &mut self.weekly,
        }
    }
}

/// Writes one document to `global_quests` per call. There is no update or
/// delete path, and no idempotency key: two calls give two records.
#[derive(Clone)]
pub struct AssignmentStore {
    store: Arc<dyn DocumentStore>,
}

impl AssignmentStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        definition: &QuestDefinition,
        frequency: Frequency,
    ) -> Result<StoredAssignment, StorageError> {
        self.record_at(definition, frequency, Utc::now()).await
    }

    pub async fn record_at(
        &self,
        definition: &QuestDefinition,
        frequency: Frequency,
        assigned_at: DateTime<Utc>,
    ) -> Result<StoredAssignment, StorageError> {
        let record = AssignmentRecord::new(definition, frequency, assigned_at);
        let body = serde_json::to_value(&record)?;
        let id = self.store.insert(GLOBAL_QUESTS, body).await?;

        info!(
            assignment_id = %id,
            quest_id = %record.quest_id,
            %frequency,
            expires_in_hours = record.expires_in_hours,
            "quest assigned"
        );

        Ok(StoredAssignment { id, record })
    }

    /// Scan `global_quests` and keep the newest record per class.
    ///
    /// Documents that do not decode as an assignment are skipped.
    pub async fn latest(&self) -> Result<ActiveQuests, StorageError> {
        let mut docs = self.store.stream_all(GLOBAL_QUESTS);
        let mut active = ActiveQuests::default();

        while let Some(doc) = docs.try_next().await? {
            let record: AssignmentRecord = match serde_json::from_value(doc.body) {
                Ok(r) => r,
                Err(e) => {
                    warn!(document_id = %doc.id, error = %e, "skipping malformed assignment");
                    continue;
                }
            };

            let slot = active.slot(record.frequency);
            let newer = slot
                .as_ref()
                .map_or(true, |current| record.assigned_at > current.record.assigned_at);
            if newer {
                *slot = Some(StoredAssignment { id: doc.id, record });
            }
        }

        Ok(active)
    }
}
