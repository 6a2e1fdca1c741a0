//! Text generation provider abstraction.
//!
//! The comment handler only needs "prompt in, text out" with the caller's
//! credential, so any backend exposing that capability can sit behind
//! [`TextProvider`].

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Empty response from provider")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,

    /// Input tokens consumed.
    pub input_tokens: i32,

    /// Output tokens generated.
    pub output_tokens: i32,

    pub finish_reason: FinishReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
}

/// Generation parameters for a single completion.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    /// Number of candidates to request.
    pub candidate_count: i32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self { candidate_count: 1 }
    }
}

#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate one text completion for `prompt`, authenticating with the
    /// caller-supplied `credential`.
    async fn generate(
        &self,
        credential: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
