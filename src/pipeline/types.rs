//! Request-scoped result types and the wire response contract.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chunker::Chunk;

/// Terminal classification of a chat result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Answer,
    Handoff,
}

/// Outcome of one retrieval pass. `scores[i]` corresponds to `chunks[i]`.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalResult {
    pub chunks: Vec<Chunk>,
    pub scores: Vec<f32>,
    pub max_score: f32,
    pub passed_threshold: bool,
    pub retrieval_time_ms: f64,
}

impl RetrievalResult {
    /// Builds a result from parallel `(chunk, score)` pairs that already
    /// passed the minimum-similarity filter.
    pub fn from_scored(scored: Vec<(Chunk, f32)>, retrieval_time_ms: f64) -> Self {
        let (chunks, scores): (Vec<Chunk>, Vec<f32>) = scored.into_iter().unzip();
        let max_score = scores.iter().copied().fold(0.0_f32, f32::max);

        Self {
            passed_threshold: !chunks.is_empty(),
            chunks,
            scores,
            max_score,
            retrieval_time_ms,
        }
    }

    /// An empty retrieval (nothing survived the filter).
    pub fn empty(retrieval_time_ms: f64) -> Self {
        Self::from_scored(Vec::new(), retrieval_time_ms)
    }
}

/// Decision from the answerability gate.
#[derive(Debug, Clone, Serialize)]
pub struct GateDecision {
    pub should_handoff: bool,
    pub reason: String,
}

impl GateDecision {
    pub fn handoff(reason: impl Into<String>) -> Self {
        Self {
            should_handoff: true,
            reason: reason.into(),
        }
    }

    pub fn pass(reason: impl Into<String>) -> Self {
        Self {
            should_handoff: false,
            reason: reason.into(),
        }
    }
}

/// Complete result of one chat request. Cached for answers; returned for
/// every kind.
///
/// Invariants: a handoff has empty `citations` and a `handoff_reason`; an
/// answer has at least one non-empty citation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResult {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub message: String,
    pub citations: Vec<String>,
    pub handoff_reason: Option<String>,
    pub retrieval: RetrievalResult,
    pub gate: GateDecision,
    pub generation_time_ms: f64,
    pub total_time_ms: f64,
    pub request_id: String,
}

impl ChatResult {
    pub fn is_answer(&self) -> bool {
        self.kind == ResponseKind::Answer
    }

    pub fn is_handoff(&self) -> bool {
        self.kind == ResponseKind::Handoff
    }
}

/// Retrieval summary exposed on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalInfo {
    pub top_similarity_score: f32,
    pub chunks_retrieved: usize,
    pub retrieval_time_ms: f64,
}

/// JSON response shape the transport layer serves to callers.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub message: String,
    pub citations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_reason: Option<String>,
    pub retrieval: RetrievalInfo,
    pub request_id: String,
    pub processing_time_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<&ChatResult> for ChatResponse {
    fn from(result: &ChatResult) -> Self {
        Self {
            kind: result.kind,
            message: result.message.clone(),
            citations: result.citations.clone(),
            handoff_reason: result.handoff_reason.clone(),
            retrieval: RetrievalInfo {
                top_similarity_score: result.retrieval.max_score,
                chunks_retrieved: result.retrieval.chunks.len(),
                retrieval_time_ms: result.retrieval.retrieval_time_ms,
            },
            request_id: result.request_id.clone(),
            processing_time_ms: result.total_time_ms,
            timestamp: Utc::now(),
        }
    }
}
