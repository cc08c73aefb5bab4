//! In-memory embedding index with cosine k-NN search.
//!
//! Built once per process from the chunked corpus and shared read-only by
//! every session; see `AppState::index` for the single-flight lifecycle.

use serde::Serialize;

use crate::core::errors::ChatError;
use crate::llm::provider::LlmProvider;

use super::chunker::Chunk;

/// One chunk paired with its embedding. Embeddings are computed once at
/// build time and never mutated.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Ordered by descending similarity, ties broken by ascending chunk index.
pub type RetrievalResult = Vec<ScoredChunk>;

#[derive(Debug)]
pub struct EmbeddingIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

impl EmbeddingIndex {
    /// Embed every chunk and store the entries.
    ///
    /// Any embedding failure aborts the whole build; a partial index is
    /// never produced. All vectors must share one dimension.
    pub async fn build(chunks: Vec<Chunk>, provider: &dyn LlmProvider) -> Result<Self, ChatError> {
        if chunks.is_empty() {
            return Ok(Self {
                entries: Vec::new(),
                dimension: 0,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = provider.embed(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(ChatError::EmbeddingFailure(format!(
                "provider returned {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(ChatError::EmbeddingFailure(
                "provider returned empty embedding vectors".to_string(),
            ));
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                if embedding.len() != dimension {
                    return Err(ChatError::EmbeddingFailure(format!(
                        "inconsistent embedding dimension for chunk {}: expected {}, got {}",
                        chunk.index,
                        dimension,
                        embedding.len()
                    )));
                }
                Ok(IndexEntry { chunk, embedding })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries, dimension })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `k` entries most similar to `query_embedding`.
    ///
    /// `k` is floored to 1 and clamped to the index size. Equal scores are
    /// ordered by ascending chunk index so retrieval is deterministic.
    pub fn search(&self, query_embedding: &[f32], k: usize) -> Result<RetrievalResult, ChatError> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if query_embedding.len() != self.dimension {
            return Err(ChatError::EmbeddingFailure(format!(
                "query embedding dimension {} does not match index dimension {}",
                query_embedding.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.index.cmp(&b.chunk.index))
        });

        let k = k.max(1).min(scored.len());
        scored.truncate(k);
        Ok(scored)
    }
}

/// Cosine similarity, clamped to [-1, 1]. Zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}
