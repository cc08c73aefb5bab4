use std::sync::Arc;
use std::time::Duration;

use crate::core::errors::ChatError;
use crate::llm::prompts::condense_prompt;
use crate::llm::provider::LlmProvider;

use super::memory::ConversationMemory;

/// Rewrites follow-up questions into standalone ones using session memory.
pub struct Condenser {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl Condenser {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// With empty memory there is nothing to resolve against, so the raw
    /// question is returned unchanged without calling the model.
    pub async fn condense(
        &self,
        raw_question: &str,
        memory: &ConversationMemory,
    ) -> Result<String, ChatError> {
        if memory.is_empty() {
            return Ok(raw_question.to_string());
        }

        let prompt = condense_prompt(&memory.render(), raw_question);
        let rewritten = tokio::time::timeout(self.timeout, self.provider.generate(&prompt))
            .await
            .map_err(|_| {
                ChatError::GenerationFailure(format!(
                    "condensation timed out after {:?}",
                    self.timeout
                ))
            })??;

        let rewritten = rewritten.trim();
        if rewritten.is_empty() {
            return Err(ChatError::GenerationFailure(
                "condensation produced an empty question".to_string(),
            ));
        }

        Ok(rewritten.to_string())
    }
}
