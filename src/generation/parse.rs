//! Parsing of untrusted model output into a tagged reply.

use serde::Deserialize;

use super::error::ParseError;

/// Reply classification declared by the model itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Answer,
    /// Default when the field is missing: an unlabeled reply is never
    /// trusted as an answer.
    #[default]
    Handoff,
}

/// Structured reply parsed from the model's JSON output. Field presence is
/// explicit: anything missing falls back to a safe default.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelReply {
    #[serde(rename = "type", default)]
    pub kind: ReplyKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub citations: Vec<String>,
    #[serde(default)]
    pub handoff_reason: Option<String>,
}

/// Extracts and parses the JSON object from raw model text.
///
/// Tries a fenced ```json block first, then falls back to the span between
/// the first `{` and the last `}`.
pub fn parse_model_reply(raw: &str) -> Result<ModelReply, ParseError> {
    let candidate = extract_json_span(raw).ok_or(ParseError::NoJsonObject)?;
    Ok(serde_json::from_str(candidate)?)
}

fn extract_json_span(raw: &str) -> Option<&str> {
    let text = if let Some(fence_start) = raw.find("```json") {
        let body = &raw[fence_start + "```json".len()..];
        match body.find("```") {
            Some(fence_end) => &body[..fence_end],
            None => body,
        }
    } else {
        raw
    };

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let reply = parse_model_reply(
            r#"{"type": "answer", "message": "CBCT is 3D imaging.", "citations": ["CBCT uses a cone-shaped beam"]}"#,
        )
        .unwrap();

        assert_eq!(reply.kind, ReplyKind::Answer);
        assert_eq!(reply.message, "CBCT is 3D imaging.");
        assert_eq!(reply.citations.len(), 1);
        assert!(reply.handoff_reason.is_none());
    }

    #[test]
    fn test_parse_fenced_json_block() {
        let raw = "Here you go:\n```json\n{\"type\": \"answer\", \"message\": \"hi\", \"citations\": [\"c\"]}\n```\ntrailing";
        let reply = parse_model_reply(raw).unwrap();

        assert_eq!(reply.kind, ReplyKind::Answer);
        assert_eq!(reply.message, "hi");
    }

    #[test]
    fn test_parse_unclosed_fence() {
        let raw = "```json\n{\"type\": \"handoff\", \"message\": \"m\", \"handoff_reason\": \"r\"}";
        let reply = parse_model_reply(raw).unwrap();

        assert_eq!(reply.kind, ReplyKind::Handoff);
        assert_eq!(reply.handoff_reason.as_deref(), Some("r"));
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let raw = "Sure! {\"type\": \"answer\", \"message\": \"m\", \"citations\": [\"c\"]} hope that helps";
        assert!(parse_model_reply(raw).is_ok());
    }

    #[test]
    fn test_no_braces_is_parse_error() {
        assert!(matches!(
            parse_model_reply("I cannot produce JSON right now."),
            Err(ParseError::NoJsonObject)
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            parse_model_reply("{\"type\": \"answer\", "),
            Err(ParseError::NoJsonObject)
        ));
        assert!(matches!(
            parse_model_reply("{\"type\": answer}"),
            Err(ParseError::InvalidJson { .. })
        ));
    }

    #[test]
    fn test_missing_type_defaults_to_handoff() {
        let reply = parse_model_reply(r#"{"message": "no label"}"#).unwrap();
        assert_eq!(reply.kind, ReplyKind::Handoff);
        assert!(reply.citations.is_empty());
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        assert!(matches!(
            parse_model_reply(r#"{"type": "maybe", "message": "m"}"#),
            Err(ParseError::InvalidJson { .. })
        ));
    }
}
