//! Answerability gate.
//!
//! Rule-based classifier run between retrieval and generation. Checks are
//! ordered and short-circuit: a query matching several rules surfaces only
//! the first reason, so the order is part of the contract (operators tune
//! thresholds and keyword lists off the surfaced reason strings).

use tracing::debug;

use crate::config::Settings;
use crate::pipeline::{GateDecision, RetrievalResult};

/// Patient-specific phrasings that always route to a human, matched as
/// case-insensitive substrings.
const PATIENT_PATTERNS: &[&str] = &[
    "my scan",
    "my x-ray",
    "my cbct",
    "my panoramic",
    "my diagnosis",
    "my treatment",
    "my tooth",
    "my teeth",
    "diagnose me",
    "analyze my",
    "look at my",
    "what should i do",
    "should i get",
    "do i need",
];

/// Decides retrieve-then-answer vs. immediate handoff.
#[derive(Debug, Clone)]
pub struct AnswerabilityGate {
    handoff_similarity_threshold: f32,
    handoff_topics: Vec<String>,
}

impl AnswerabilityGate {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            handoff_similarity_threshold: settings.handoff_similarity_threshold,
            handoff_topics: settings
                .handoff_required_topics()
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    /// Pure function of the query and retrieval outcome. Check order:
    /// no chunks, low similarity, disallowed topic, patient-specific, pass.
    pub fn decide(&self, query: &str, retrieval: &RetrievalResult) -> GateDecision {
        let query_lower = query.to_lowercase();

        if retrieval.chunks.is_empty() {
            return self.log(GateDecision::handoff(
                "no relevant information found in knowledge base",
            ));
        }

        // Strict less-than: a score exactly at the threshold passes.
        if retrieval.max_score < self.handoff_similarity_threshold {
            return self.log(GateDecision::handoff(format!(
                "low similarity score ({:.3})",
                retrieval.max_score
            )));
        }

        for topic in &self.handoff_topics {
            if query_lower.contains(topic.as_str()) {
                return self.log(GateDecision::handoff(format!(
                    "query requires live support: contains '{topic}'"
                )));
            }
        }

        for pattern in PATIENT_PATTERNS {
            if query_lower.contains(pattern) {
                return self.log(GateDecision::handoff("patient-specific query"));
            }
        }

        GateDecision::pass("query is answerable from knowledge base")
    }

    fn log(&self, decision: GateDecision) -> GateDecision {
        debug!(reason = %decision.reason, "Gate triggered handoff");
        decision
    }
}
