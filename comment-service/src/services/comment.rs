//! Comment generation: Gemini when the caller brings a usable key, a fixed
//! Turkish template otherwise.

use crate::models::{CommentRequest, CommentResponse};
use crate::services::providers::{GenerationParams, TextProvider};
use std::sync::Arc;

#[derive(Clone)]
pub struct CommentService {
    provider: Arc<dyn TextProvider>,
}

impl CommentService {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider }
    }

    /// Produce a comment for `request`. Provider failures come back as a
    /// `key_error` response, never as an `Err`.
    pub async fn comment(&self, request: &CommentRequest) -> CommentResponse {
        let Some(credential) = request.usable_key() else {
            let key_provided = request.key_provided();
            tracing::info!(key_provided, "No usable API key, using fallback comment");
            return CommentResponse::fallback(fallback_comment(request), key_provided);
        };

        let prompt = build_prompt(request);
        let params = GenerationParams::default();

        match self.provider.generate(credential, &prompt, &params).await {
            Ok(response) => {
                tracing::debug!(
                    model = %self.provider.model(),
                    input_tokens = response.input_tokens,
                    output_tokens = response.output_tokens,
                    finish_reason = ?response.finish_reason,
                    "Generated comment"
                );
                CommentResponse::generated(response.text.trim())
            }
            Err(e) => {
                tracing::warn!(
                    model = %self.provider.model(),
                    error = %e,
                    "Comment generation failed with caller key"
                );
                CommentResponse::key_error(e)
            }
        }
    }
}

/// Prompt sent to the model. Price and site clauses are only added when set.
pub fn build_prompt(request: &CommentRequest) -> String {
    let mut prompt = format!("\"{}\" ürününü analiz et. ", request.title);
    if let Some(price) = request.price() {
        prompt.push_str(&format!("Fiyat: {}. ", price));
    }
    if let Some(site) = request.site() {
        prompt.push_str(&format!("Site: {}. ", site));
    }
    prompt.push_str("MAX 3 cümle, Türkçe, kısa ve net olsun.");
    prompt
}

/// Deterministic comment used without a usable key. A missing site leaves
/// its slot empty, hence the double space in that case.
pub fn fallback_comment(request: &CommentRequest) -> String {
    let mut comment = format!(
        "{} ürünü {} listeleniyor. ",
        request.title,
        request.site().unwrap_or_default()
    );
    if let Some(price) = request.price() {
        comment.push_str(&format!("Fiyat: {}. ", price));
    }
    comment.push_str("Fiyat/performans değerlendirilebilir.");
    comment
}
