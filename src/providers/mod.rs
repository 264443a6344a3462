/*!
 * Provider implementations for the external text-completion capabilities.
 *
 * The pipeline depends on one synchronous request/response contract: a
 * system instruction plus user text in, translated (or classified) text
 * out. Any provider implementing [`Provider`] can back both the translation
 * capability and the auxiliary entity-identification capability.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// One chat-completion request, shaped per the external interface contract.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System instruction guiding the model
    pub system_instruction: String,

    /// The user text to operate on
    pub user_text: String,

    /// Sampling temperature
    pub sampling_temperature: f32,

    /// Maximum number of output tokens
    pub max_output_tokens: u32,
}

impl ChatRequest {
    pub fn new(system_instruction: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_text: user_text.into(),
            sampling_temperature: 0.1,
            max_output_tokens: 1024,
        }
    }

    /// Set the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.sampling_temperature = temperature;
        self
    }

    /// Set the output token cap.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_output_tokens = max_tokens;
        self
    }
}

/// Common trait for all completion providers.
///
/// Implementations must be usable from concurrent translation tasks, so the
/// trait requires `Send + Sync`.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request, returning the response text.
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError>;

    /// Test the connection to the provider.
    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = ChatRequest::new("You are a connectivity probe.", "Hello").max_tokens(10);
        self.complete(request).await.map(|_| ())
    }
}

pub mod mock;
pub mod openai;
