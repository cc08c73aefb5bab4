use async_trait::async_trait;

use crate::core::errors::ChatError;

/// Opaque language-model backend used by the pipeline.
///
/// Both the condenser and the synthesizer go through `generate`; chunk and
/// query embeddings go through `embed`. Implementations must return vectors
/// of one consistent dimension for the lifetime of an index.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "gemini")
    fn name(&self) -> &str;

    /// text completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String, ChatError>;

    /// embeddings for a batch of inputs, one vector per input, same order
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ChatError>;
}
