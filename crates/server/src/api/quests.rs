//! Read-only views of quest state for the mobile client.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use usquest_core::QuestCatalog;
use usquest_storage::StoredAssignment;

use crate::state::AppState;

use super::{api_error, ApiError};

#[derive(Debug, Serialize)]
pub struct ActiveQuestView {
    #[serde(flatten)]
    pub assignment: StoredAssignment,
    pub expires_at: DateTime<Utc>,
    /// Still inside its expiry window.
    pub active: bool,
}

impl ActiveQuestView {
    fn at(assignment: StoredAssignment, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: assignment.record.expires_at(),
            active: assignment.record.is_active_at(now),
            assignment,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActiveQuestsResponse {
    pub daily: Option<ActiveQuestView>,
    pub weekly: Option<ActiveQuestView>,
}

/// Newest assignment of each class, expired or not.
pub async fn active_quests(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActiveQuestsResponse>, ApiError> {
    let latest = state.assignments.latest().await.map_err(|e| {
        warn!(error = %e, "active quest lookup failed");
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Database connection failed: {e}"),
        )
    })?;

    let now = Utc::now();
    Ok(Json(ActiveQuestsResponse {
        daily: latest.daily.map(|a| ActiveQuestView::at(a, now)),
        weekly: latest.weekly.map(|a| ActiveQuestView::at(a, now)),
    }))
}

pub async fn quest_catalog(State(state): State<Arc<AppState>>) -> Json<QuestCatalog> {
    Json(state.catalog.as_ref().clone())
}
