use axum::{extract::rejection::JsonRejection, extract::State, Json};
use service_core::error::AppError;

use crate::models::{CommentRequest, CommentResponse};
use crate::startup::AppState;

/// `POST /ai/yorum`
///
/// Only malformed bodies produce a non-200 status. Generation failures are
/// reported inside the response with `source = "key_error"`.
#[tracing::instrument(skip(state, payload))]
pub async fn create_comment(
    State(state): State<AppState>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<CommentResponse>, AppError> {
    let Json(request) = payload?;

    let response = state.comment_service.comment(&request).await;

    tracing::info!(source = ?response.source, "Comment produced");

    Ok(Json(response))
}
