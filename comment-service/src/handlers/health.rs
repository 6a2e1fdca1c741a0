use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::startup::AppState;

/// Liveness probe. The service has no backing store, so being able to
/// answer is the whole check.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "comment-service",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.environment,
    }))
}
