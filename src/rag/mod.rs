//! Retrieval side of the pipeline.
//!
//! This module provides:
//! - `chunker`: splits the corpus into overlapping passages
//! - `index`: embeds chunks and serves cosine k-NN lookups
//! - `retriever`: fixed-k semantic search over the shared index

pub mod chunker;
pub mod index;
pub mod retriever;

pub use chunker::{Chunk, Document};
pub use index::{EmbeddingIndex, RetrievalResult, ScoredChunk};
pub use retriever::Retriever;
