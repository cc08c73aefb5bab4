use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::chat::{Condenser, Orchestrator, Synthesizer, TurnOutcome};
use crate::config::AppConfig;
use crate::core::errors::ChatError;
use crate::llm::{GeminiProvider, LlmProvider};
use crate::rag::chunker::{split, Document};
use crate::rag::index::EmbeddingIndex;
use crate::rag::retriever::Retriever;

/// One conversation. The async mutex around it serializes turns: a question
/// is processed to completion before the next one for the same session.
pub struct ChatSession {
    pub orchestrator: Orchestrator,
    pub created_at: DateTime<Utc>,
}

pub type SharedSession = Arc<AsyncMutex<ChatSession>>;

pub struct AppState {
    pub config: AppConfig,
    provider: Arc<dyn LlmProvider>,
    /// Single-flight cell for the corpus index: the lock is held for the
    /// whole build, so concurrent callers wait on one in-flight build
    /// instead of starting their own.
    index: AsyncMutex<Option<Arc<EmbeddingIndex>>>,
    sessions: Mutex<HashMap<String, SharedSession>>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Production wiring: Gemini provider from config + environment.
    pub fn initialize(config: AppConfig) -> Result<Arc<Self>, ChatError> {
        let provider = Arc::new(GeminiProvider::from_config(&config.generation)?);
        Ok(Self::with_provider(config, provider))
    }

    /// Test/bench wiring with an injected provider.
    pub fn with_provider(config: AppConfig, provider: Arc<dyn LlmProvider>) -> Arc<Self> {
        Arc::new(Self {
            config,
            provider,
            index: AsyncMutex::new(None),
            sessions: Mutex::new(HashMap::new()),
            started_at: Utc::now(),
        })
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.generation.request_timeout_secs)
    }

    /// Get the shared corpus index, building it on first use.
    pub async fn index(&self) -> Result<Arc<EmbeddingIndex>, ChatError> {
        let mut guard = self.index.lock().await;
        if let Some(index) = guard.as_ref() {
            return Ok(index.clone());
        }

        let index = Arc::new(self.build_index().await?);
        *guard = Some(index.clone());
        Ok(index)
    }

    /// Drop the cached index so the next access rebuilds it. Test hook; the
    /// corpus is otherwise fixed for the process lifetime.
    pub async fn invalidate_index(&self) {
        let mut guard = self.index.lock().await;
        *guard = None;
    }

    async fn build_index(&self) -> Result<EmbeddingIndex, ChatError> {
        let path = &self.config.corpus.path;
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            ChatError::Internal(format!("cannot read corpus {}: {}", path.display(), e))
        })?;

        let document = Document::new(text, self.config.corpus_source());
        let chunks = split(
            &document,
            self.config.chunking.chunk_size,
            self.config.chunking.overlap,
        )?;

        tracing::info!(
            chunks = chunks.len(),
            source = %document.source,
            "building embedding index"
        );

        let index = tokio::time::timeout(
            self.request_timeout(),
            EmbeddingIndex::build(chunks, self.provider.as_ref()),
        )
        .await
        .map_err(|_| {
            ChatError::EmbeddingFailure(format!(
                "index build timed out after {:?}",
                self.request_timeout()
            ))
        })??;

        tracing::info!(entries = index.len(), dimension = index.dimension(), "index ready");
        Ok(index)
    }

    fn new_orchestrator(&self) -> Orchestrator {
        let timeout = self.request_timeout();
        Orchestrator::new(
            Condenser::new(self.provider.clone(), timeout),
            Retriever::new(self.provider.clone(), self.config.retrieval.top_k, timeout),
            Synthesizer::new(
                self.provider.clone(),
                self.config.answer.fallback.clone(),
                timeout,
            ),
        )
    }

    pub fn create_session(&self) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(AsyncMutex::new(ChatSession {
            orchestrator: self.new_orchestrator(),
            created_at: Utc::now(),
        }));

        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .insert(session_id.clone(), session);
        session_id
    }

    pub fn session(&self, session_id: &str) -> Option<SharedSession> {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .get(session_id)
            .cloned()
    }

    pub fn remove_session(&self, session_id: &str) -> bool {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .remove(session_id)
            .is_some()
    }

    pub fn sessions_snapshot(&self) -> Vec<(String, SharedSession)> {
        self.sessions
            .lock()
            .expect("session map lock poisoned")
            .iter()
            .map(|(id, session)| (id.clone(), session.clone()))
            .collect()
    }

    /// Session-facing entry point: answer one question for one session.
    pub async fn submit_question(
        &self,
        session_id: &str,
        question: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::BadRequest("question must not be empty".to_string()));
        }

        let session = self
            .session(session_id)
            .ok_or_else(|| ChatError::NotFound(format!("session not found: {}", session_id)))?;

        let index = self.index().await?;
        let mut session = session.lock().await;
        session.orchestrator.run_turn(question, &index).await
    }
}
