pub mod gemini;
pub mod prompts;
pub mod provider;

pub use gemini::GeminiProvider;
pub use provider::LlmProvider;
