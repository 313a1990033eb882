//! Token-window corpus chunker.
//!
//! Splits raw knowledge-base text into overlapping, token-bounded segments:
//! the unit of retrieval. A HuggingFace tokenizer file gives token-exact
//! windows; without one the chunker falls back to whitespace tokens, which
//! keeps the same window semantics for tests and tokenizer-less deployments.

pub mod error;

pub use error::ChunkerError;

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

/// A bounded, overlapping segment of corpus text with a dense zero-based id.
///
/// Created once at index-build time; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    pub text: String,
    pub id: u32,
    pub source: String,
    pub token_count: usize,
}

enum ChunkerBackend {
    HuggingFace(tokenizers::Tokenizer),
    Whitespace,
}

/// Chunks text into sliding token windows of `chunk_size` advancing by
/// `chunk_size - overlap`.
pub struct TokenChunker {
    backend: ChunkerBackend,
    chunk_size: usize,
    overlap: usize,
}

impl std::fmt::Debug for TokenChunker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenChunker")
            .field(
                "backend",
                &match self.backend {
                    ChunkerBackend::HuggingFace(_) => "HuggingFace",
                    ChunkerBackend::Whitespace => "Whitespace",
                },
            )
            .field("chunk_size", &self.chunk_size)
            .field("overlap", &self.overlap)
            .finish()
    }
}

impl TokenChunker {
    /// Creates a chunker backed by a HuggingFace `tokenizer.json` file.
    pub fn from_tokenizer_file<P: AsRef<Path>>(
        path: P,
        chunk_size: usize,
        overlap: usize,
    ) -> Result<Self, ChunkerError> {
        Self::check_window(chunk_size, overlap)?;

        let path = path.as_ref();
        if !path.exists() {
            return Err(ChunkerError::TokenizerNotFound {
                path: path.to_path_buf(),
            });
        }

        let tokenizer = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            ChunkerError::TokenizerLoadFailed {
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            backend: ChunkerBackend::HuggingFace(tokenizer),
            chunk_size,
            overlap,
        })
    }

    /// Creates a chunker that tokenizes on whitespace. Used when no
    /// tokenizer file is configured.
    pub fn whitespace(chunk_size: usize, overlap: usize) -> Result<Self, ChunkerError> {
        Self::check_window(chunk_size, overlap)?;
        warn!("No chunker tokenizer configured, falling back to whitespace tokens");
        Ok(Self {
            backend: ChunkerBackend::Whitespace,
            chunk_size,
            overlap,
        })
    }

    fn check_window(chunk_size: usize, overlap: usize) -> Result<(), ChunkerError> {
        if overlap >= chunk_size {
            return Err(ChunkerError::InvalidWindow {
                chunk_size,
                overlap,
            });
        }
        Ok(())
    }

    /// Splits `text` into overlapping chunks. Deterministic: the same input
    /// always yields the same chunk sequence. Windows that trim to nothing
    /// are dropped without consuming an id, so ids stay dense.
    pub fn chunk(&self, text: &str, source: &str) -> Result<Vec<Chunk>, ChunkerError> {
        let chunks = match &self.backend {
            ChunkerBackend::HuggingFace(tokenizer) => self.chunk_hf(tokenizer, text, source)?,
            ChunkerBackend::Whitespace => self.chunk_whitespace(text, source),
        };

        debug!(
            source = source,
            text_len = text.len(),
            chunks = chunks.len(),
            "Chunked corpus text"
        );

        Ok(chunks)
    }

    fn chunk_hf(
        &self,
        tokenizer: &tokenizers::Tokenizer,
        text: &str,
        source: &str,
    ) -> Result<Vec<Chunk>, ChunkerError> {
        let encoding = tokenizer.encode(text, false).map_err(|e| {
            ChunkerError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;
        let tokens = encoding.get_ids();

        let mut chunks = Vec::new();
        let mut chunk_id: u32 = 0;

        for window in Windows::new(tokens.len(), self.chunk_size, self.step()) {
            let window_tokens = &tokens[window.clone()];
            let decoded = tokenizer.decode(window_tokens, true).map_err(|e| {
                ChunkerError::TokenizationFailed {
                    reason: e.to_string(),
                }
            })?;

            let trimmed = decoded.trim();
            if trimmed.is_empty() {
                continue;
            }

            chunks.push(Chunk {
                text: trimmed.to_string(),
                id: chunk_id,
                source: source.to_string(),
                token_count: window_tokens.len(),
            });
            chunk_id += 1;
        }

        Ok(chunks)
    }

    fn chunk_whitespace(&self, text: &str, source: &str) -> Vec<Chunk> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let mut chunks = Vec::new();
        let mut chunk_id: u32 = 0;

        for window in Windows::new(tokens.len(), self.chunk_size, self.step()) {
            let window_tokens = &tokens[window.clone()];
            let decoded = window_tokens.join(" ");

            let trimmed = decoded.trim();
            if trimmed.is_empty() {
                continue;
            }

            chunks.push(Chunk {
                text: trimmed.to_string(),
                id: chunk_id,
                source: source.to_string(),
                token_count: window_tokens.len(),
            });
            chunk_id += 1;
        }

        chunks
    }

    fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Iterator over sliding window ranges: `[start, min(start + size, len))`
/// with `start` advancing by `step` until it reaches `len`.
struct Windows {
    len: usize,
    size: usize,
    step: usize,
    start: usize,
}

impl Windows {
    fn new(len: usize, size: usize, step: usize) -> Self {
        Self {
            len,
            size,
            step,
            start: 0,
        }
    }
}

impl Iterator for Windows {
    type Item = std::ops::Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start >= self.len {
            return None;
        }
        let end = (self.start + self.size).min(self.len);
        let range = self.start..end;
        self.start += self.step;
        Some(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_rejects_overlap_ge_chunk_size() {
        assert!(matches!(
            TokenChunker::whitespace(10, 10),
            Err(ChunkerError::InvalidWindow { .. })
        ));
        assert!(matches!(
            TokenChunker::whitespace(10, 12),
            Err(ChunkerError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_single_chunk_when_text_fits() {
        let chunker = TokenChunker::whitespace(10, 2).unwrap();
        let chunks = chunker.chunk(&words(7), "kb").unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, 0);
        assert_eq!(chunks[0].token_count, 7);
        assert_eq!(chunks[0].source, "kb");
    }

    #[test]
    fn test_window_sizes_and_overlap() {
        // 10 tokens, windows of 4, step 2: [0..4), [2..6), [4..8), [6..10), [8..10)
        let chunker = TokenChunker::whitespace(4, 2).unwrap();
        let chunks = chunker.chunk(&words(10), "kb").unwrap();

        assert_eq!(chunks.len(), 5);
        for chunk in &chunks {
            assert!(chunk.token_count <= 4);
        }

        // Consecutive full windows overlap by exactly `overlap` tokens.
        for pair in chunks.windows(2) {
            let prev: Vec<&str> = pair[0].text.split_whitespace().collect();
            let next: Vec<&str> = pair[1].text.split_whitespace().collect();
            let overlap = 2.min(prev.len()).min(next.len());
            assert_eq!(&prev[prev.len() - overlap..], &next[..overlap]);
        }
    }

    #[test]
    fn test_ids_are_dense_and_zero_based() {
        let chunker = TokenChunker::whitespace(4, 1).unwrap();
        let chunks = chunker.chunk(&words(20), "kb").unwrap();

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id as usize, i);
        }
    }

    #[test]
    fn test_deterministic() {
        let chunker = TokenChunker::whitespace(5, 2).unwrap();
        let text = words(23);

        let a = chunker.chunk(&text, "kb").unwrap();
        let b = chunker.chunk(&text, "kb").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = TokenChunker::whitespace(4, 1).unwrap();
        assert!(chunker.chunk("", "kb").unwrap().is_empty());
        assert!(chunker.chunk("   \n\t ", "kb").unwrap().is_empty());
    }

    #[test]
    fn test_chunk_text_is_trimmed() {
        let chunker = TokenChunker::whitespace(3, 1).unwrap();
        let chunks = chunker.chunk("  alpha beta gamma delta  ", "kb").unwrap();

        for chunk in &chunks {
            assert_eq!(chunk.text, chunk.text.trim());
        }
    }
}
