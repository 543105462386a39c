use std::sync::Arc;

use usquest_core::QuestCatalog;
use usquest_notify::{NotificationDispatcher, NotificationTemplates};
use usquest_storage::{AssignmentStore, StorageEngine};

use crate::cycle::QuestCycle;

/// Shared application state handed to every handler and scheduler task.
pub struct AppState {
    /// Expected value of the `x-cron-token` header.
    pub cron_secret: String,
    pub cycle: QuestCycle,
    pub assignments: AssignmentStore,
    pub catalog: Arc<QuestCatalog>,
    pub storage_backend: String,
}

impl AppState {
    pub fn new(
        cron_secret: impl Into<String>,
        catalog: Arc<QuestCatalog>,
        storage: &StorageEngine,
        dispatcher: NotificationDispatcher,
        templates: NotificationTemplates,
    ) -> Self {
        Self {
            cron_secret: cron_secret.into(),
            cycle: QuestCycle::new(catalog.clone(), storage, dispatcher, templates),
            assignments: storage.assignments(),
            catalog,
            storage_backend: storage.backend_name().to_string(),
        }
    }
}
