use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum IndexError {
    /// `search` was called before `build`. Fatal at startup: initialization
    /// must abort rather than serve an empty index.
    #[error("vector index not built; call build() first")]
    NotBuilt,

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}
