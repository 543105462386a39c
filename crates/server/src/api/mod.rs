//! Domain-focused API endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared error types live here in mod.rs.

mod cron;
mod health;
mod quests;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ── Re-exports ───────────────────────────────────────────────────
// Keeps flat `api::foo` paths for route registration in router.rs.

pub use cron::{trigger_daily, trigger_weekly, CronAuth, TriggerResponse, CRON_TOKEN_HEADER};
pub use health::{health, root};
pub use quests::{active_quests, quest_catalog};
