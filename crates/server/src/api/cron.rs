//! Cron-triggered quest endpoints.
//!
//! An external scheduler calls `POST /api/cron/{daily,weekly}` with the
//! shared secret in the `x-cron-token` header. Each authorized call runs
//! exactly one quest cycle; repeated calls create repeated assignments.

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

use usquest_core::Frequency;

use crate::cycle::CycleError;
use crate::state::AppState;

use super::{api_error, ApiError};

pub const CRON_TOKEN_HEADER: &str = "x-cron-token";

/// Proof that the request carried the cron secret.
///
/// Extracted before any handler logic runs, so a rejected request selects,
/// writes and sends nothing.
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

impl FromRequestParts<Arc<AppState>> for CronAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(CRON_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(token) if constant_time_eq(token, &state.cron_secret) => Ok(CronAuth),
            Some(_) => {
                warn!(path = %parts.uri.path(), "cron trigger rejected: wrong token");
                Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized"))
            }
            None => {
                warn!(path = %parts.uri.path(), "cron trigger rejected: missing x-cron-token header");
                Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized"))
            }
        }
    }
}

/// Compare without short-circuiting on the first differing byte.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub status: &'static str,
    /// Title of the quest that was assigned.
    pub quest: String,
}

pub async fn trigger_daily(
    _auth: CronAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TriggerResponse>, ApiError> {
    run_trigger(&state, Frequency::Daily).await
}

pub async fn trigger_weekly(
    _auth: CronAuth,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TriggerResponse>, ApiError> {
    run_trigger(&state, Frequency::Weekly).await
}

async fn run_trigger(
    state: &AppState,
    frequency: Frequency,
) -> Result<Json<TriggerResponse>, ApiError> {
    match state.cycle.run(frequency).await {
        Ok(report) => Ok(Json(TriggerResponse {
            status: "success",
            quest: report.assignment.record.title,
        })),
        Err(CycleError::Selection(e)) => {
            error!(%frequency, error = %e, "cron trigger failed: no quest selected");
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {e}"),
            ))
        }
        Err(CycleError::Persistence(e)) => {
            error!(%frequency, error = %e, "cron trigger failed: assignment not persisted");
            Err(api_error(
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Database connection failed: {e}"),
            ))
        }
    }
}
