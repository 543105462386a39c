//! Liveness endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub app: &'static str,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok",
        app: "UsQuest Backend API",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: String,
    pub catalog_quests: usize,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage_backend.clone(),
        catalog_quests: state.catalog.len(),
    })
}
