//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("failed to parse {name}='{value}' as {expected}")]
    ParseError {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Chunk overlap must be strictly smaller than the chunk size, otherwise
    /// the chunker window never advances.
    #[error("chunk_overlap_tokens ({overlap}) must be less than chunk_size_tokens ({chunk_size})")]
    InvalidChunking { chunk_size: usize, overlap: usize },

    /// A similarity threshold was outside the valid [0, 1] range.
    #[error("{name} must be within [0.0, 1.0], got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },

    /// A count setting must be at least one.
    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },
}
