//! ByteDent RAG support engine.
//!
//! Answers natural-language questions from a fixed dental knowledge corpus
//! using retrieval-augmented generation, and hands off to a human for
//! anything it cannot answer confidently or that touches disallowed topics
//! (pricing, personal medical advice, patient-specific data).
//!
//! # Pipeline
//!
//! [`ChatEngine::chat`] runs cache check → retrieval → answerability gate →
//! generation → parse → validation, returning a [`ChatResult`] that the
//! transport layer serializes via [`ChatResponse`].
//!
//! # Public API Surface
//!
//! - [`Settings`], [`ConfigError`] — engine configuration
//! - [`TokenChunker`], [`Chunk`] — corpus chunking
//! - [`Embedder`], [`EmbedderConfig`] — sentence embeddings (candle BERT,
//!   with a deterministic stub mode for tests)
//! - [`VectorIndex`] — flat exact inner-product search
//! - [`ResponseCache`], [`CacheStats`] — answer memoization
//! - [`AnswerabilityGate`], [`GateDecision`] — rule-based gating
//! - [`LanguageModel`], [`GenaiModel`] — generation seam
//! - [`ChatEngine`], [`ChatResult`], [`ChatResponse`] — orchestration
//!
//! ## Test/Mock Support
//!
//! [`MockModel`] is available behind `#[cfg(any(test, feature = "mock"))]`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use bytedent::{
//!     ChatEngine, Embedder, EmbedderConfig, GenaiModel, Settings, TokenChunker, VectorIndex,
//!     knowledge,
//! };
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//!
//! let chunker = TokenChunker::whitespace(
//!     settings.chunk_size_tokens,
//!     settings.chunk_overlap_tokens,
//! )?;
//! let embedder = Embedder::load(EmbedderConfig::stub())?;
//! let model = Arc::new(GenaiModel::new(settings.chat_model.clone()));
//! let corpus = knowledge::load(settings.corpus_path.as_deref())?;
//!
//! let engine = ChatEngine::new(
//!     settings,
//!     &chunker,
//!     VectorIndex::new(embedder),
//!     model,
//!     &corpus,
//! )?;
//!
//! let result = engine.chat("What is a CBCT scan?", None).await?;
//! println!("{}", result.message);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod chunker;
pub mod config;
pub mod embedding;
pub mod gate;
pub mod generation;
pub mod hashing;
pub mod index;
pub mod knowledge;
pub mod pipeline;

pub use cache::{CacheStats, ResponseCache};
pub use chunker::{Chunk, ChunkerError, TokenChunker};
pub use config::{ConfigError, Settings};
pub use embedding::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_MAX_SEQ_LEN, Embedder, EmbedderConfig, EmbeddingError,
};
pub use gate::AnswerabilityGate;
pub use generation::{
    GenaiModel, GenerationError, GenerationOptions, LanguageModel, ModelReply, ParseError,
    ReplyKind, ReplyValidation, build_prompt, format_context, parse_model_reply, validate_reply,
};
#[cfg(any(test, feature = "mock"))]
pub use generation::MockModel;
pub use hashing::{hash_query, normalize_query};
pub use index::{IndexError, VectorIndex};
pub use pipeline::{
    ChatEngine, ChatResponse, ChatResult, EngineError, GateDecision, ResponseKind, RetrievalInfo,
    RetrievalResult,
};
