//! One quest cycle: select, persist, enumerate recipients, dispatch.
//!
//! Each stage gates the next. Selection and persistence failures abort the
//! cycle; after the assignment is durable, recipient and push failures are
//! logged and reported but never undo or fail the cycle.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use usquest_core::{AssignmentRecord, Frequency, QuestCatalog, QuestError, QuestSelector};
use usquest_notify::{DispatchOutcome, NotificationDispatcher, NotificationTemplates, TemplateRenderer};
use usquest_storage::{AssignmentStore, RecipientEnumerator, StorageEngine, StorageError, StoredAssignment};

/// Why a cycle stopped before its assignment became durable.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// No quest could be selected for the class.
    #[error("quest selection failed: {0}")]
    Selection(#[from] QuestError),
    /// The assignment could not be written.
    #[error("assignment could not be persisted: {0}")]
    Persistence(#[from] StorageError),
}

/// What a completed cycle did.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub assignment: StoredAssignment,
    /// Usable push tokens found, `None` when enumeration failed.
    pub recipients: Option<usize>,
    pub enumeration_error: Option<String>,
    pub dispatch: DispatchOutcome,
}

/// Runs quest cycles against shared storage and a push transport.
pub struct QuestCycle {
    selector: QuestSelector,
    assignments: AssignmentStore,
    recipients: RecipientEnumerator,
    dispatcher: NotificationDispatcher,
    renderer: TemplateRenderer,
    templates: NotificationTemplates,
}

impl QuestCycle {
    pub fn new(
        catalog: Arc<QuestCatalog>,
        storage: &StorageEngine,
        dispatcher: NotificationDispatcher,
        templates: NotificationTemplates,
    ) -> Self {
        Self {
            selector: QuestSelector::new(catalog),
            assignments: storage.assignments(),
            recipients: storage.recipients(),
            dispatcher,
            renderer: TemplateRenderer::new(),
            templates,
        }
    }

    /// Run one cycle for `frequency`.
    ///
    /// Returns `Ok` once the assignment is durable, whatever happened to
    /// the notification afterwards.
    pub async fn run(&self, frequency: Frequency) -> Result<CycleReport, CycleError> {
        let quest = self.selector.select(frequency)?;
        info!(%frequency, quest_id = %quest.id, title = %quest.title, "quest selected");

        let assignment = self.assignments.record(quest, frequency).await?;

        let (tokens, enumeration_error) = match self.recipients.collect_tokens().await {
            Ok(tokens) => (tokens, None),
            Err(e) => {
                warn!(
                    assignment_id = %assignment.id,
                    error = %e,
                    "recipient enumeration failed — notification skipped"
                );
                (Vec::new(), Some(e.to_string()))
            }
        };
        let recipients = enumeration_error.is_none().then_some(tokens.len());

        let (title, body) = self.notification_text(&assignment.record);
        let data = json!({
            "quest_id": assignment.record.quest_id,
            "assignment_id": assignment.id,
            "frequency": frequency,
            "type": assignment.record.quest_type,
        });
        let dispatch = self.dispatcher.dispatch(&title, &body, &data, tokens).await;

        info!(
            %frequency,
            assignment_id = %assignment.id,
            quest_id = %assignment.record.quest_id,
            recipients = recipients.unwrap_or(0),
            notified = dispatch.accepted(),
            "quest cycle complete"
        );

        Ok(CycleReport {
            assignment,
            recipients,
            enumeration_error,
            dispatch,
        })
    }

    /// Render title and body, falling back to the raw quest text.
    fn notification_text(&self, record: &AssignmentRecord) -> (String, String) {
        match self.templates.render(&self.renderer, record) {
            Ok(text) => text,
            Err(e) => {
                warn!(quest_id = %record.quest_id, error = %e, "notification template failed — using quest text");
                (record.title.clone(), record.description.clone())
            }
        }
    }
}
