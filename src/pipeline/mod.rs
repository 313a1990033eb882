//! Pipeline orchestrator.
//!
//! Composes the components into the end-to-end request flow:
//! cache check → retrieve → gate → generate → parse → validate → cache.
//! Terminal states are answer and handoff; both produce a [`ChatResult`].
//! Handoffs from different exit points share the result shape but carry
//! distinct `handoff_reason` strings — the operator-facing signal for
//! tuning thresholds and keyword lists.

pub mod error;
pub mod types;

pub use error::EngineError;
pub use types::{
    ChatResponse, ChatResult, GateDecision, ResponseKind, RetrievalInfo, RetrievalResult,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cache::{CacheStats, ResponseCache};
use crate::chunker::TokenChunker;
use crate::config::Settings;
use crate::gate::AnswerabilityGate;
use crate::generation::{
    GenerationOptions, LanguageModel, ReplyKind, ReplyValidation, build_prompt, format_context,
    parse_model_reply, validate_reply,
};
use crate::index::VectorIndex;

const HANDOFF_MESSAGE: &str =
    "I need to connect you with a support specialist who can better assist you with this request.";
const PARSE_FAILURE_MESSAGE: &str =
    "I'm having trouble processing your request. Let me connect you with support.";
const UNCERTAINTY_MESSAGE: &str =
    "I'm not completely certain about this answer. Let me connect you with support.";
const MISSING_CITATIONS_MESSAGE: &str =
    "I need to verify this information. Let me connect you with support.";

/// The RAG chat engine. Explicitly constructed and dependency-injected;
/// build it once at process start and share it by reference — its lifetime
/// is the process lifetime and everything but the cache is read-only after
/// construction.
pub struct ChatEngine {
    settings: Settings,
    index: VectorIndex,
    gate: AnswerabilityGate,
    model: Arc<dyn LanguageModel>,
    generation_options: GenerationOptions,
    /// The generative model call is inference-bound and assumed
    /// non-reentrant per handle: at most one in-flight generation at a
    /// time. Scale out by process replication, not in-process parallelism.
    generation_lock: tokio::sync::Mutex<()>,
    cache: ResponseCache,
    started_at: Instant,
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine")
            .field("index", &self.index)
            .field("cache", &self.cache)
            .field("model", &self.model.model_info())
            .finish()
    }
}

impl ChatEngine {
    /// Builds the engine: validates settings, chunks the corpus, and builds
    /// the vector index. Any failure here is fatal — a process must not
    /// start serving with an empty or unbuilt index.
    pub fn new(
        settings: Settings,
        chunker: &TokenChunker,
        index: VectorIndex,
        model: Arc<dyn LanguageModel>,
        corpus: &str,
    ) -> Result<Self, EngineError> {
        settings.validate()?;

        let chunks = chunker.chunk(corpus, "dental_kb")?;
        info!(chunks = chunks.len(), "Knowledge base chunked");

        let mut index = index;
        index.build(chunks)?;

        let gate = AnswerabilityGate::from_settings(&settings);
        let generation_options = GenerationOptions::from_settings(&settings);
        let cache = ResponseCache::new(
            settings.cache_capacity,
            Duration::from_secs(settings.cache_ttl_secs),
        );

        info!(
            vectors = index.len(),
            model = %model.model_info(),
            "Chat engine initialized"
        );

        Ok(Self {
            settings,
            index,
            gate,
            model,
            generation_options,
            generation_lock: tokio::sync::Mutex::new(()),
            cache,
            started_at: Instant::now(),
        })
    }

    /// Processes a question through the full pipeline.
    ///
    /// Always returns a well-formed [`ChatResult`] except for true
    /// infrastructure failures (provider/index errors), which surface as
    /// [`EngineError`]. There are no internal retries: a parse failure
    /// becomes a deterministic handoff rather than a second model call.
    #[instrument(skip(self, question), fields(request_id))]
    pub async fn chat(
        &self,
        question: &str,
        request_id: Option<String>,
    ) -> Result<ChatResult, EngineError> {
        let total_start = Instant::now();
        let request_id = request_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::Span::current().record("request_id", request_id.as_str());

        info!("Processing chat request");

        if let Some(mut cached) = self.cache.get(question) {
            info!("Cache hit for query");
            cached.request_id = request_id;
            cached.total_time_ms = elapsed_ms(total_start);
            return Ok(cached);
        }

        let retrieval = self.retrieve(question)?;

        let gate = self.gate.decide(question, &retrieval);
        if gate.should_handoff {
            info!(reason = %gate.reason, "Handoff triggered by gate");
            return Ok(self.handoff(
                HANDOFF_MESSAGE,
                gate.reason.clone(),
                retrieval,
                gate,
                0.0,
                total_start,
                request_id,
            ));
        }

        let generation_start = Instant::now();
        let context = format_context(&retrieval.chunks);
        let prompt = build_prompt(&context, question);

        let raw_output = {
            let _guard = self.generation_lock.lock().await;
            self.model
                .complete(&prompt, &self.generation_options)
                .await?
        };
        let generation_time_ms = elapsed_ms(generation_start);

        let reply = match parse_model_reply(&raw_output) {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Failed to parse model response");
                return Ok(self.handoff(
                    PARSE_FAILURE_MESSAGE,
                    "failed to parse model response",
                    retrieval,
                    gate,
                    generation_time_ms,
                    total_start,
                    request_id,
                ));
            }
        };

        match validate_reply(&reply, self.settings.uncertainty_keywords()) {
            ReplyValidation::Uncertain => {
                return Ok(self.handoff(
                    UNCERTAINTY_MESSAGE,
                    "model expressed uncertainty",
                    retrieval,
                    gate,
                    generation_time_ms,
                    total_start,
                    request_id,
                ));
            }
            ReplyValidation::MissingCitations => {
                return Ok(self.handoff(
                    MISSING_CITATIONS_MESSAGE,
                    "answer without citations",
                    retrieval,
                    gate,
                    generation_time_ms,
                    total_start,
                    request_id,
                ));
            }
            ReplyValidation::Valid => {}
        }

        if reply.kind == ReplyKind::Handoff {
            // The model itself declined; honor it but never cache it.
            let message = if reply.message.trim().is_empty() {
                HANDOFF_MESSAGE.to_string()
            } else {
                reply.message
            };
            let reason = reply
                .handoff_reason
                .unwrap_or_else(|| "model declined to answer".to_string());
            return Ok(self.handoff(
                &message,
                reason,
                retrieval,
                gate,
                generation_time_ms,
                total_start,
                request_id,
            ));
        }

        let result = ChatResult {
            kind: ResponseKind::Answer,
            message: reply.message,
            citations: reply.citations,
            handoff_reason: None,
            retrieval,
            gate,
            generation_time_ms,
            total_time_ms: elapsed_ms(total_start),
            request_id,
        };

        info!(
            duration_ms = result.total_time_ms,
            "Chat completed successfully"
        );

        self.cache.set(question, &result);
        Ok(result)
    }

    /// Runs the similarity search and applies the minimum-similarity filter
    /// (a score exactly at the threshold passes). The gate separately
    /// re-checks overall confidence against the handoff threshold.
    fn retrieve(&self, question: &str) -> Result<RetrievalResult, EngineError> {
        let start = Instant::now();

        let results = self
            .index
            .search(question, self.settings.retrieval_top_k)?;

        let filtered: Vec<_> = results
            .into_iter()
            .filter(|(_, score)| *score >= self.settings.min_similarity_threshold)
            .collect();

        Ok(RetrievalResult::from_scored(filtered, elapsed_ms(start)))
    }

    #[allow(clippy::too_many_arguments)]
    fn handoff(
        &self,
        message: &str,
        reason: impl Into<String>,
        retrieval: RetrievalResult,
        gate: GateDecision,
        generation_time_ms: f64,
        total_start: Instant,
        request_id: String,
    ) -> ChatResult {
        ChatResult {
            kind: ResponseKind::Handoff,
            message: message.to_string(),
            citations: Vec::new(),
            handoff_reason: Some(reason.into()),
            retrieval,
            gate,
            generation_time_ms,
            total_time_ms: elapsed_ms(total_start),
            request_id,
        }
    }

    /// `true` iff the model handle and the vector index are initialized and
    /// the index holds at least one vector.
    pub fn is_healthy(&self) -> bool {
        !self.index.is_empty()
    }

    /// Seconds since engine construction.
    pub fn uptime(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }

    /// Model identifier for health reporting.
    pub fn model_info(&self) -> String {
        self.model.model_info()
    }

    /// Response-cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Engine settings (read-only).
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
