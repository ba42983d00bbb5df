use axum::{response::IntoResponse, Json};

/// Liveness probe; does not touch the store.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
