use thiserror::Error;

use crate::chunker::ChunkerError;
use crate::config::ConfigError;
use crate::generation::GenerationError;
use crate::index::IndexError;

/// Infrastructure failures surfaced to the caller. Everything answerability-
/// related (gate decisions, parse failures, validation) becomes a handoff
/// result instead and never appears here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("corpus chunking failed: {0}")]
    Chunker(#[from] ChunkerError),

    #[error("vector index error: {0}")]
    Index(#[from] IndexError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}
