//! Prompt construction for the generative model.

use crate::chunker::Chunk;

/// Fixed system instruction. The JSON output contract here is what
/// [`parse_model_reply`](super::parse_model_reply) expects back.
const SYSTEM_INSTRUCTION: &str = r#"You are a helpful support assistant for ByteDent, an AI-powered dental imaging analysis platform.

CRITICAL RULES:
1. Answer ONLY using the provided CONTEXT below
2. If CONTEXT is insufficient or missing, you MUST respond with type="handoff"
3. NEVER provide medical diagnoses, treatment recommendations, or personalized medical advice
4. NEVER guess, hallucinate, or infer information not in CONTEXT
5. ALWAYS cite specific parts of CONTEXT in your citations array
6. Keep responses professional, accurate, and educational
7. For pricing, specific patient cases, or medical advice, ALWAYS handoff
8. Remind users that ByteDent findings should be verified by a licensed dental professional

RESPONSE FORMAT (JSON only):
{
  "type": "answer" or "handoff",
  "message": "your response to the user",
  "citations": ["relevant quote from context 1", "relevant quote from context 2"],
  "handoff_reason": "only if type=handoff, explain why"
}"#;

/// Formats retrieved chunks into a numbered context block. The empty case
/// is unreachable in practice (the gate hands off first) but kept as a
/// sentinel.
pub fn format_context(chunks: &[Chunk]) -> String {
    if chunks.is_empty() {
        return "[No relevant context found]".to_string();
    }

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Context {}]\n{}", i + 1, chunk.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the single prompt sent to the model.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "{SYSTEM_INSTRUCTION}\n\nCONTEXT:\n{context}\n\nUSER QUESTION:\n{question}\n\nRespond with JSON only, no other text:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: u32, text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            id,
            source: "kb".to_string(),
            token_count: text.split_whitespace().count(),
        }
    }

    #[test]
    fn test_format_context_numbers_chunks() {
        let context = format_context(&[chunk(0, "first"), chunk(1, "second")]);

        assert!(context.contains("[Context 1]\nfirst"));
        assert!(context.contains("[Context 2]\nsecond"));
    }

    #[test]
    fn test_format_context_empty_sentinel() {
        assert_eq!(format_context(&[]), "[No relevant context found]");
    }

    #[test]
    fn test_prompt_embeds_context_and_question() {
        let prompt = build_prompt("[Context 1]\nCBCT info", "What is CBCT?");

        assert!(prompt.contains("CONTEXT:\n[Context 1]\nCBCT info"));
        assert!(prompt.contains("USER QUESTION:\nWhat is CBCT?"));
        assert!(prompt.contains("JSON only"));
    }
}
