use std::sync::Arc;
use std::time::Duration;

use crate::core::errors::ChatError;
use crate::llm::provider::LlmProvider;

use super::index::{EmbeddingIndex, RetrievalResult};

/// Fixed-k semantic search over the shared embedding index.
pub struct Retriever {
    provider: Arc<dyn LlmProvider>,
    top_k: usize,
    timeout: Duration,
}

impl Retriever {
    pub fn new(provider: Arc<dyn LlmProvider>, top_k: usize, timeout: Duration) -> Self {
        Self {
            provider,
            top_k,
            timeout,
        }
    }

    /// Embed the standalone question and look up the top-k chunks.
    ///
    /// An embedding failure (including a timed-out upstream call) is fatal
    /// for the turn and surfaces to the caller.
    pub async fn retrieve(
        &self,
        standalone_question: &str,
        index: &EmbeddingIndex,
    ) -> Result<RetrievalResult, ChatError> {
        let inputs = vec![standalone_question.to_string()];
        let mut embeddings = tokio::time::timeout(self.timeout, self.provider.embed(&inputs))
            .await
            .map_err(|_| {
                ChatError::EmbeddingFailure(format!(
                    "query embedding timed out after {:?}",
                    self.timeout
                ))
            })??;

        let query_embedding = embeddings.pop().ok_or_else(|| {
            ChatError::EmbeddingFailure("provider returned no embedding for the query".to_string())
        })?;

        index.search(&query_embedding, self.top_k)
    }
}
