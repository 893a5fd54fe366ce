//! Abstraction over the vision LLM: the real provider and a deterministic mock both satisfy the
//! same contract the [`crate::engine::DecisionEngine`] normalises.

use async_trait::async_trait;

use crate::errors::AgentError;

/// One call to the configured vision model: a marked screenshot plus the
/// assembled prompt text, returning the raw response text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn generate(&self, screenshot_png: &[u8], prompt: &str) -> Result<String, AgentError>;
}

/// Deterministic provider for tests and offline development: always
/// returns a `wait` decision referencing the prompt length, never errors.
#[derive(Debug, Default, Clone)]
pub struct MockLlmProvider;

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn generate(&self, _screenshot_png: &[u8], prompt: &str) -> Result<String, AgentError> {
        Ok(format!(
            r#"{{"thought": "Mock provider received a {} character prompt.", "action": "wait"}}"#,
            prompt.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_provider_returns_parseable_json() {
        let provider = MockLlmProvider;
        let text = provider.generate(&[], "hello").await.unwrap();
        assert!(text.contains("\"action\": \"wait\""));
    }
}
