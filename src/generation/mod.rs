//! Generative-model invocation, output parsing, and validation.
//!
//! The model sits behind the [`LanguageModel`] trait so the pipeline can be
//! exercised with [`MockModel`] in tests. The real implementation goes
//! through the `genai` provider client with near-greedy decoding and a
//! bounded output length.

pub mod error;
pub mod parse;
pub mod prompt;
pub mod validate;

pub use error::{GenerationError, ParseError};
pub use parse::{ModelReply, ReplyKind, parse_model_reply};
pub use prompt::{build_prompt, format_context};
pub use validate::{ReplyValidation, validate_reply};

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::{debug, error};

use crate::config::Settings;

/// Decoding parameters for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// Generation stops on malformed-markdown fences or excessive blank
    /// lines rather than letting the model ramble past the JSON object.
    pub stop_sequences: Vec<String>,
}

impl GenerationOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_tokens: settings.max_new_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            stop_sequences: vec!["```".to_string(), "\n\n\n".to_string()],
        }
    }
}

/// A blocking (per request) completion call against a generative model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Runs one completion and returns the raw model text.
    async fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;

    /// Human-readable model identifier for health reporting.
    fn model_info(&self) -> String;
}

/// Provider-backed model via the `genai` client.
pub struct GenaiModel {
    client: Client,
    model: String,
}

impl GenaiModel {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
        }
    }

    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

impl std::fmt::Debug for GenaiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiModel")
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl LanguageModel for GenaiModel {
    async fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let chat_options = ChatOptions::default()
            .with_temperature(options.temperature)
            .with_top_p(options.top_p)
            .with_max_tokens(options.max_tokens)
            .with_stop_sequences(options.stop_sequences.clone());

        debug!(model = %self.model, prompt_len = prompt.len(), "Calling generation provider");

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&chat_options))
            .await
            .map_err(|e| {
                error!(model = %self.model, "Provider error: {e}");
                GenerationError::Provider {
                    reason: e.to_string(),
                }
            })?;

        Ok(response.first_text().unwrap_or_default().trim().to_string())
    }

    fn model_info(&self) -> String {
        self.model.clone()
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockModel;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::{GenerationError, GenerationOptions, LanguageModel};

    /// Scripted model for tests: replies are served FIFO and every call is
    /// counted, so tests can assert that a cached path skipped generation.
    #[derive(Debug, Default)]
    pub struct MockModel {
        replies: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    impl MockModel {
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a mock preloaded with raw model outputs.
        pub fn with_replies<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
                ..Self::default()
            }
        }

        /// Creates a mock whose every call fails with a provider error.
        pub fn failing(reason: impl Into<String>) -> Self {
            Self {
                fail_with: Some(reason.into()),
                ..Self::default()
            }
        }

        pub fn push_reply(&self, reply: impl Into<String>) {
            self.replies.lock().push_back(reply.into());
        }

        /// Number of `complete` calls made so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl LanguageModel for MockModel {
        async fn complete(
            &self,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(reason) = &self.fail_with {
                return Err(GenerationError::Provider {
                    reason: reason.clone(),
                });
            }

            self.replies
                .lock()
                .pop_front()
                .ok_or_else(|| GenerationError::Provider {
                    reason: "mock model has no scripted replies left".to_string(),
                })
        }

        fn model_info(&self) -> String {
            "mock".to_string()
        }
    }
}
