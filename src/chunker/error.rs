use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkerError {
    #[error("tokenizer file not found at path: {path}")]
    TokenizerNotFound { path: PathBuf },

    #[error("failed to load tokenizer: {reason}")]
    TokenizerLoadFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("chunk overlap ({overlap}) must be less than chunk size ({chunk_size})")]
    InvalidWindow { chunk_size: usize, overlap: usize },
}
