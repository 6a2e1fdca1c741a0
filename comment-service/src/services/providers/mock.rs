//! Mock provider implementation for testing.

use super::{FinishReason, GenerationParams, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::Mutex;

/// Scripted outcome of a mock call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Text(String),
    ApiError(String),
    NetworkError(String),
}

/// Mock text provider that answers every call with the same outcome and
/// remembers the prompts it was given.
pub struct MockTextProvider {
    outcome: MockOutcome,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockOutcome::Text(text.into()))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(MockOutcome::ApiError(message.into()))
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts().len()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        _credential: &str,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<ProviderResponse, ProviderError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.outcome {
            MockOutcome::Text(text) => Ok(ProviderResponse {
                text: text.clone(),
                input_tokens: approx_tokens(prompt),
                output_tokens: approx_tokens(text),
                finish_reason: FinishReason::Complete,
            }),
            MockOutcome::ApiError(message) => Err(ProviderError::ApiError(message.clone())),
            MockOutcome::NetworkError(message) => {
                Err(ProviderError::NetworkError(message.clone()))
            }
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// Rough four-bytes-per-token estimate.
fn approx_tokens(text: &str) -> i32 {
    i32::try_from(text.len() / 4).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_estimate_is_quarter_of_bytes() {
        assert_eq!(approx_tokens(""), 0);
        assert_eq!(approx_tokens("abcdefgh"), 2);
    }

    #[tokio::test]
    async fn text_outcome_reports_usage() {
        let provider = MockTextProvider::replying("abcd");
        let response = provider
            .generate("AIza", "12345678", &GenerationParams::default())
            .await
            .unwrap();

        assert_eq!(response.input_tokens, 2);
        assert_eq!(response.output_tokens, 1);
        assert_eq!(provider.call_count(), 1);
    }
}
