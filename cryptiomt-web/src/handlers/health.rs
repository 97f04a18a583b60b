//! Health check handlers

use super::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, response::Json};
use tracing::warn;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Check the server and document store health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_available = match state.application.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Document store health check failed: {}", e);
            false
        }
    };

    Json(HealthResponse {
        status: if store_available { "healthy" } else { "degraded" }.to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store_available,
    })
}
