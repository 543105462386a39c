//! HTTP router construction.
//!
//! Assembles all Axum routes and middleware into a single `Router`.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, cors_origin: &str) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/api/cron/daily", post(api::trigger_daily))
        .route("/api/cron/weekly", post(api::trigger_weekly))
        .route("/api/quests/active", get(api::active_quests))
        .route("/api/quests/catalog", get(api::quest_catalog))
        .layer(cors_layer(cors_origin))
        .with_state(state)
}

/// `*` allows any origin; anything else is a comma-separated allow list.
fn cors_layer(cors_origin: &str) -> CorsLayer {
    if cors_origin.trim() == "*" {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors_origin
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(origins))
}
