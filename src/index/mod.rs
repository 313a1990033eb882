//! Flat exact inner-product vector index.
//!
//! Vectors are unit-normalized by the embedder, so inner product equals
//! cosine similarity. The index is built once at startup and is read-only
//! afterwards; rebuilding from scratch is the only mutation path. At corpus
//! scale (hundreds of chunks) a brute-force scan beats any ANN structure.

pub mod error;

pub use error::IndexError;

use tracing::{debug, info};

use crate::chunker::Chunk;
use crate::embedding::Embedder;

/// In-memory flat index over corpus chunks.
pub struct VectorIndex {
    embedder: Embedder,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("vectors", &self.vectors.len())
            .field("dim", &self.embedder.embedding_dim())
            .finish()
    }
}

impl VectorIndex {
    /// Creates an empty, unbuilt index around an embedder.
    pub fn new(embedder: Embedder) -> Self {
        Self {
            embedder,
            chunks: Vec::new(),
            vectors: Vec::new(),
        }
    }

    /// Embeds every chunk and stores the vectors. One-shot, non-incremental;
    /// calling it again replaces the previous contents.
    pub fn build(&mut self, chunks: Vec<Chunk>) -> Result<(), IndexError> {
        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            vectors.push(self.embedder.embed(&chunk.text)?);
        }

        info!(vectors = vectors.len(), "Vector index built");

        self.chunks = chunks;
        self.vectors = vectors;
        Ok(())
    }

    /// Searches for the `top_k` most similar chunks, descending by score.
    /// Ties keep insertion order. Returns [`IndexError::NotBuilt`] if the
    /// index holds no vectors.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<(Chunk, f32)>, IndexError> {
        if self.vectors.is_empty() {
            return Err(IndexError::NotBuilt);
        }

        let query_vec = self.embedder.embed(query)?;

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, dot(&query_vec, v)))
            .collect();

        // Stable sort keeps index order for equal scores.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        debug!(
            query_len = query.len(),
            results = scored.len(),
            top_score = scored.first().map(|(_, s)| *s),
            "Index search complete"
        );

        Ok(scored
            .into_iter()
            .map(|(i, score)| (self.chunks[i].clone(), score))
            .collect())
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns `true` if the index has not been built (or was built empty).
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The embedder backing this index.
    pub fn embedder(&self) -> &Embedder {
        &self.embedder
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
