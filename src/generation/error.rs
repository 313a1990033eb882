use thiserror::Error;

/// Infrastructure failure in the generative-model call. Unlike parse or
/// validation failures this is never converted into a handoff: it signals
/// malfunction, not an answerability judgment, and must surface to the
/// caller as a generic internal error.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model provider request failed: {reason}")]
    Provider { reason: String },
}

/// Model output had no recoverable JSON object. Recovered locally by the
/// orchestrator (converted to a handoff), never surfaced to callers.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("model output is not valid JSON: {source}")]
    InvalidJson {
        #[from]
        source: serde_json::Error,
    },
}
