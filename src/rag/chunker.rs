//! Sliding-window corpus chunking.
//!
//! Chunks are measured in characters, not bytes, so multi-byte UTF-8 text
//! (the corpus is Turkish) splits at character boundaries.

use serde::{Deserialize, Serialize};

use crate::core::errors::ChatError;

/// Raw corpus text plus its source identifier. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Document {
    pub text: String,
    pub source: String,
}

impl Document {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// A contiguous passage of a document.
///
/// `start..end` is the char-offset range within the document. Consecutive
/// chunks of a document overlap by exactly the configured overlap, except
/// the final chunk which may be shorter than the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

/// Split `document` into overlapping windows of `chunk_size` chars,
/// advancing by `chunk_size - overlap` per step.
pub fn split(document: &Document, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>, ChatError> {
    if chunk_size == 0 {
        return Err(ChatError::InvalidConfig(
            "chunk_size must be positive".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(ChatError::InvalidConfig(format!(
            "overlap ({}) must be smaller than chunk_size ({})",
            overlap, chunk_size
        )));
    }

    let chars: Vec<char> = document.text.chars().collect();
    let total = chars.len();
    let step = chunk_size - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while start < total {
        let end = (start + chunk_size).min(total);
        chunks.push(Chunk {
            text: chars[start..end].iter().collect(),
            source: document.source.clone(),
            index,
            start,
            end,
        });

        if end == total {
            break;
        }
        start += step;
        index += 1;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::new(text, "test")
    }

    /// Dropping each chunk's leading overlap chars and concatenating must
    /// reproduce the document exactly.
    fn reconstruct(chunks: &[Chunk], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(&chunk.text);
            } else {
                out.extend(chunk.text.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn chunks_reconstruct_original_text() {
        let text = "Konya'da etli ekmek meşhurdur. Konya'da Mevlana Müzesi ziyaret edilebilir.";
        let document = doc(text);

        for (chunk_size, overlap) in [(50, 10), (20, 5), (7, 3), (1000, 200)] {
            let chunks = split(&document, chunk_size, overlap).expect("valid config");
            assert_eq!(reconstruct(&chunks, overlap), text, "size={chunk_size} overlap={overlap}");
        }
    }

    #[test]
    fn consecutive_chunks_overlap_exactly() {
        let text: String = ('a'..='z').cycle().take(100).collect();
        let chunks = split(&doc(&text), 30, 10).expect("valid config");

        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 10);
            let tail: String = pair[0].text.chars().skip(20).collect();
            let head: String = pair[1].text.chars().take(10).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn final_chunk_may_be_shorter() {
        let chunks = split(&doc("abcdefghij"), 4, 1).expect("valid config");
        let last = chunks.last().expect("at least one chunk");
        assert!(last.text.chars().count() <= 4);
        assert_eq!(last.end, 10);
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let chunks = split(&doc(&"x".repeat(95)), 10, 3).expect("valid config");
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    #[test]
    fn overlap_equal_to_chunk_size_is_invalid() {
        let err = split(&doc("abc"), 5, 5).expect_err("overlap == chunk_size");
        assert!(matches!(err, ChatError::InvalidConfig(_)));
    }

    #[test]
    fn overlap_greater_than_chunk_size_is_invalid() {
        let err = split(&doc("abc"), 5, 9).expect_err("overlap > chunk_size");
        assert!(matches!(err, ChatError::InvalidConfig(_)));
    }

    #[test]
    fn zero_chunk_size_is_invalid() {
        let err = split(&doc("abc"), 0, 0).expect_err("chunk_size == 0");
        assert!(matches!(err, ChatError::InvalidConfig(_)));
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunks = split(&doc(""), 10, 2).expect("valid config");
        assert!(chunks.is_empty());
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "şğüöçİı".repeat(10);
        let chunks = split(&doc(&text), 12, 4).expect("valid config");
        assert_eq!(reconstruct(&chunks, 4), text);
    }
}
