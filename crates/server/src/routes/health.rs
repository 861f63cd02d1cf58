//! Health check endpoint

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
}

/// GET /health - Liveness probe
pub async fn check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}
