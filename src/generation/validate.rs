//! Post-hoc validation of "answer"-typed replies.
//!
//! The model cannot be fully trusted to obey the system instruction, so
//! every answer passes this second line of defense before it is returned
//! or cached. Validation failures are policy branches, not errors: the
//! orchestrator converts them into handoffs.

use super::parse::{ModelReply, ReplyKind};

/// Verdict on an answer-typed reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyValidation {
    Valid,
    /// The message trips the uncertainty-keyword scan.
    Uncertain,
    /// The citations list is empty or holds only blank strings.
    MissingCitations,
}

/// Validates a parsed reply. Handoff-typed replies are always `Valid` —
/// the checks only guard answers.
pub fn validate_reply(reply: &ModelReply, uncertainty_keywords: &[&str]) -> ReplyValidation {
    if reply.kind != ReplyKind::Answer {
        return ReplyValidation::Valid;
    }

    let message_lower = reply.message.to_lowercase();
    if uncertainty_keywords
        .iter()
        .any(|keyword| message_lower.contains(keyword))
    {
        return ReplyValidation::Uncertain;
    }

    if !reply.citations.iter().any(|c| !c.trim().is_empty()) {
        return ReplyValidation::MissingCitations;
    }

    ReplyValidation::Valid
}
