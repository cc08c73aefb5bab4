use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::ChatError;

pub const CONFIG_ENV_VAR: &str = "REHBER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration, loaded once at startup.
///
/// Chunking and retrieval parameters are validated up front so that bad
/// values abort startup instead of surfacing mid-conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    /// UTF-8 text file holding the knowledge corpus. Read once at index build.
    pub path: PathBuf,
    /// Source identifier attached to every chunk. Defaults to the file name.
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks handed to the synthesizer per question.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    /// Upper bound for any single upstream embedding/generation call.
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            generation_model: "gemini-2.5-flash".to_string(),
            embedding_model: "embedding-001".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            temperature: 0.7,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    /// Sentence returned verbatim when the retrieved context does not
    /// address the question. Product wording, not an engineering contract.
    pub fallback: String,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            fallback: "Bu konuda elimde bilgi yok, ama istersen Türkiye'deki diğer \
                       şehirlerle ilgili önerilerde bulunabilirim."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub log_dir: PathBuf,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            allowed_origins: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from the path in `REHBER_CONFIG`, falling back to `config.toml`.
    pub fn load_default() -> Result<Self, ChatError> {
        let path = env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(Path::new(&path))
    }

    pub fn load(path: &Path) -> Result<Self, ChatError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            ChatError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&raw)
            .map_err(|e| ChatError::InvalidConfig(format!("cannot parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.chunking.chunk_size == 0 {
            return Err(ChatError::InvalidConfig(
                "chunking.chunk_size must be positive".to_string(),
            ));
        }
        if self.chunking.overlap >= self.chunking.chunk_size {
            return Err(ChatError::InvalidConfig(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunking.overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(ChatError::InvalidConfig(
                "retrieval.top_k must be positive".to_string(),
            ));
        }
        if self.corpus.path.as_os_str().is_empty() {
            return Err(ChatError::InvalidConfig(
                "corpus.path must be set".to_string(),
            ));
        }
        Ok(())
    }

    /// Source identifier for chunks: configured value or the corpus file name.
    pub fn corpus_source(&self) -> String {
        self.corpus.source.clone().unwrap_or_else(|| {
            self.corpus
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "corpus".to_string())
        })
    }
}
