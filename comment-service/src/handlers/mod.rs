//! HTTP handlers for the comment service.

pub mod comment;
pub mod health;

use axum::http::Uri;
use service_core::error::AppError;

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("route {} not found", uri.path()))
}
