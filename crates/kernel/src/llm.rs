//! Vision-LLM provider boundary. The real upstream call is an
//! external-provider concern and is not implemented here; [`DynLlmProvider`]
//! lets the Decision Engine be handed whatever [`LlmProvider`] the
//! deployment configures, defaulting to [`MockLlmProvider`] exactly the
//! way the Decision Engine's own tests exercise it.

use std::sync::Arc;

use agent_core::{AgentError, LlmProvider, MockLlmProvider};
use async_trait::async_trait;

/// Type-erased [`LlmProvider`], so [`agent_core::DecisionEngine`] can be
/// instantiated once in the kernel regardless of which concrete provider
/// a deployment wires in.
#[derive(Clone)]
pub struct DynLlmProvider(pub Arc<dyn LlmProvider>);

impl DynLlmProvider {
    pub fn mock() -> Self {
        Self(Arc::new(MockLlmProvider))
    }
}

#[async_trait]
impl LlmProvider for DynLlmProvider {
    async fn generate(&self, screenshot_png: &[u8], prompt: &str) -> Result<String, AgentError> {
        self.0.generate(screenshot_png, prompt).await
    }
}
