//! Environment-backed engine settings.
//!
//! Every setting has a default. Override with `BYTEDENT_*` environment
//! variables via [`Settings::from_env`].

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;

/// Hedging phrases that force an "answer"-typed model reply into a handoff.
const UNCERTAINTY_KEYWORDS: &[&str] = &[
    "i'm not sure",
    "i don't know",
    "unclear",
    "not enough information",
    "cannot determine",
    "insufficient context",
    "i apologize",
    "consult your dentist",
    "seek professional advice",
    "cannot diagnose",
];

/// Topics that always require live support, matched case-insensitively as
/// substrings of the query.
const HANDOFF_REQUIRED_TOPICS: &[&str] = &[
    "pricing",
    "price",
    "cost",
    "quote",
    "subscription",
    "my scan",
    "my image",
    "my diagnosis",
    "my treatment",
    "specific patient",
    "patient name",
    "medical advice",
    "prescription",
    "medication",
    "legal",
    "malpractice",
    "insurance claim",
    "billing",
    "refund",
];

/// Engine configuration loaded from environment variables.
///
/// Use [`Settings::from_env`] to read `BYTEDENT_*` overrides on top of
/// defaults, then [`Settings::validate`] before constructing the engine.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Number of nearest neighbors fetched per query. Default: `5`.
    pub retrieval_top_k: usize,

    /// Chunks scoring below this are dropped from retrieval results
    /// (a score exactly at the threshold passes). Default: `0.25`.
    pub min_similarity_threshold: f32,

    /// The gate hands off when the best retrieval score is strictly below
    /// this. Default: `0.30`.
    pub handoff_similarity_threshold: f32,

    /// Sliding-window width in tokens. Default: `400`.
    pub chunk_size_tokens: usize,

    /// Token overlap between consecutive windows. Default: `80`.
    pub chunk_overlap_tokens: usize,

    /// Max entries in the response cache. Default: `100`.
    pub cache_capacity: usize,

    /// Cache entry time-to-live in seconds. Default: `3600`.
    pub cache_ttl_secs: u64,

    /// Generation output cap in tokens. Default: `256`.
    pub max_new_tokens: u32,

    /// Sampling temperature (near-greedy for determinism). Default: `0.1`.
    pub temperature: f64,

    /// Nucleus sampling parameter. Default: `0.9`.
    pub top_p: f64,

    /// Model name passed to the generation provider.
    /// Default: `gpt-4o-mini`.
    pub chat_model: String,

    /// Directory holding the embedding model (`config.json`,
    /// `model.safetensors`, `tokenizer.json`). `None` runs the embedder in
    /// deterministic stub mode.
    pub embedder_dir: Option<PathBuf>,

    /// Tokenizer file used by the chunker. `None` falls back to whitespace
    /// tokenization.
    pub chunker_tokenizer_path: Option<PathBuf>,

    /// Optional corpus file overriding the built-in knowledge base.
    pub corpus_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            retrieval_top_k: 5,
            min_similarity_threshold: 0.25,
            handoff_similarity_threshold: 0.30,
            chunk_size_tokens: 400,
            chunk_overlap_tokens: 80,
            cache_capacity: 100,
            cache_ttl_secs: 3600,
            max_new_tokens: 256,
            temperature: 0.1,
            top_p: 0.9,
            chat_model: "gpt-4o-mini".to_string(),
            embedder_dir: None,
            chunker_tokenizer_path: None,
            corpus_path: None,
        }
    }
}

impl Settings {
    const ENV_TOP_K: &'static str = "BYTEDENT_RETRIEVAL_TOP_K";
    const ENV_MIN_SIMILARITY: &'static str = "BYTEDENT_MIN_SIMILARITY_THRESHOLD";
    const ENV_HANDOFF_SIMILARITY: &'static str = "BYTEDENT_HANDOFF_SIMILARITY_THRESHOLD";
    const ENV_CHUNK_SIZE: &'static str = "BYTEDENT_CHUNK_SIZE_TOKENS";
    const ENV_CHUNK_OVERLAP: &'static str = "BYTEDENT_CHUNK_OVERLAP_TOKENS";
    const ENV_CACHE_CAPACITY: &'static str = "BYTEDENT_CACHE_CAPACITY";
    const ENV_CACHE_TTL: &'static str = "BYTEDENT_CACHE_TTL_SECS";
    const ENV_MAX_NEW_TOKENS: &'static str = "BYTEDENT_MAX_NEW_TOKENS";
    const ENV_TEMPERATURE: &'static str = "BYTEDENT_TEMPERATURE";
    const ENV_TOP_P: &'static str = "BYTEDENT_TOP_P";
    const ENV_CHAT_MODEL: &'static str = "BYTEDENT_CHAT_MODEL";
    const ENV_EMBEDDER_DIR: &'static str = "BYTEDENT_EMBEDDER_DIR";
    const ENV_CHUNKER_TOKENIZER: &'static str = "BYTEDENT_CHUNKER_TOKENIZER";
    const ENV_CORPUS_PATH: &'static str = "BYTEDENT_CORPUS_PATH";

    /// Loads settings from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            retrieval_top_k: Self::parse_from_env(Self::ENV_TOP_K, defaults.retrieval_top_k)?,
            min_similarity_threshold: Self::parse_from_env(
                Self::ENV_MIN_SIMILARITY,
                defaults.min_similarity_threshold,
            )?,
            handoff_similarity_threshold: Self::parse_from_env(
                Self::ENV_HANDOFF_SIMILARITY,
                defaults.handoff_similarity_threshold,
            )?,
            chunk_size_tokens: Self::parse_from_env(
                Self::ENV_CHUNK_SIZE,
                defaults.chunk_size_tokens,
            )?,
            chunk_overlap_tokens: Self::parse_from_env(
                Self::ENV_CHUNK_OVERLAP,
                defaults.chunk_overlap_tokens,
            )?,
            cache_capacity: Self::parse_from_env(
                Self::ENV_CACHE_CAPACITY,
                defaults.cache_capacity,
            )?,
            cache_ttl_secs: Self::parse_from_env(Self::ENV_CACHE_TTL, defaults.cache_ttl_secs)?,
            max_new_tokens: Self::parse_from_env(
                Self::ENV_MAX_NEW_TOKENS,
                defaults.max_new_tokens,
            )?,
            temperature: Self::parse_from_env(Self::ENV_TEMPERATURE, defaults.temperature)?,
            top_p: Self::parse_from_env(Self::ENV_TOP_P, defaults.top_p)?,
            chat_model: Self::parse_string_from_env(Self::ENV_CHAT_MODEL, defaults.chat_model),
            embedder_dir: Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_DIR),
            chunker_tokenizer_path: Self::parse_optional_path_from_env(
                Self::ENV_CHUNKER_TOKENIZER,
            ),
            corpus_path: Self::parse_optional_path_from_env(Self::ENV_CORPUS_PATH),
        })
    }

    /// Validates numeric invariants and configured paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_overlap_tokens >= self.chunk_size_tokens {
            return Err(ConfigError::InvalidChunking {
                chunk_size: self.chunk_size_tokens,
                overlap: self.chunk_overlap_tokens,
            });
        }

        for (name, value) in [
            ("min_similarity_threshold", self.min_similarity_threshold),
            (
                "handoff_similarity_threshold",
                self.handoff_similarity_threshold,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if self.retrieval_top_k == 0 {
            return Err(ConfigError::ZeroCount {
                name: "retrieval_top_k",
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::ZeroCount {
                name: "cache_capacity",
            });
        }

        for path in [
            self.embedder_dir.as_ref(),
            self.chunker_tokenizer_path.as_ref(),
            self.corpus_path.as_ref(),
        ]
        .into_iter()
        .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Hedging phrases scanned in "answer"-typed model replies.
    pub fn uncertainty_keywords(&self) -> &'static [&'static str] {
        UNCERTAINTY_KEYWORDS
    }

    /// Topic keywords that always route to live support.
    pub fn handoff_required_topics(&self) -> &'static [&'static str] {
        HANDOFF_REQUIRED_TOPICS
    }

    fn parse_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
    {
        match env::var(name) {
            Ok(value) => value.parse().map_err(|_| ConfigError::ParseError {
                name,
                value,
                expected: std::any::type_name::<T>(),
            }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(name: &'static str, default: String) -> String {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(default)
    }

    fn parse_optional_path_from_env(name: &'static str) -> Option<PathBuf> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}
