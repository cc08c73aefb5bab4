use std::sync::Arc;
use std::time::Duration;

use crate::core::errors::ChatError;
use crate::llm::prompts::answer_prompt;
use crate::llm::provider::LlmProvider;
use crate::rag::index::RetrievalResult;

/// Produces a grounded answer from a standalone question and retrieved chunks.
pub struct Synthesizer {
    provider: Arc<dyn LlmProvider>,
    fallback: String,
    timeout: Duration,
}

impl Synthesizer {
    pub fn new(provider: Arc<dyn LlmProvider>, fallback: String, timeout: Duration) -> Self {
        Self {
            provider,
            fallback,
            timeout,
        }
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Concatenate the chunk texts in retrieval order and generate an answer
    /// restricted to that context. With no retrieved chunks there is nothing
    /// to ground an answer in, so the fallback sentence is returned directly.
    pub async fn synthesize(
        &self,
        standalone_question: &str,
        retrieved: &RetrievalResult,
    ) -> Result<String, ChatError> {
        if retrieved.is_empty() {
            return Ok(self.fallback.clone());
        }

        let context = retrieved
            .iter()
            .map(|scored| scored.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = answer_prompt(&context, standalone_question, &self.fallback);
        let answer = tokio::time::timeout(self.timeout, self.provider.generate(&prompt))
            .await
            .map_err(|_| {
                ChatError::GenerationFailure(format!(
                    "synthesis timed out after {:?}",
                    self.timeout
                ))
            })??;

        Ok(answer.trim().to_string())
    }
}
