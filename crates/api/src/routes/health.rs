//! Health check endpoint.

use axum::Json;

/// Returns a static OK payload.
pub async fn check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
