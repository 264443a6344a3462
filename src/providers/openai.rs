/*!
 * OpenAI-compatible chat-completion client.
 *
 * Works against the public OpenAI API and any server speaking the same
 * protocol (LM Studio, vLLM, local gateways). The pipeline only relies on
 * the request/response contract in [`crate::providers`], so this client is
 * interchangeable with any other [`Provider`].
 */

use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

use super::{ChatRequest, Provider};

/// OpenAI-compatible API client.
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to the public API)
    endpoint: String,
    /// Model name
    model: String,
}

/// Wire format of a chat message.
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

/// Wire format of a completion request.
#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// Wire format of a completion response.
#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

impl OpenAI {
    /// Create a new client. An empty endpoint means the public OpenAI API.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/chat/completions".to_string()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let wire_request = WireRequest {
            model: self.model.clone(),
            messages: vec![
                WireMessage { role: "system".to_string(), content: request.system_instruction },
                WireMessage { role: "user".to_string(), content: request.user_text },
            ],
            temperature: request.sampling_temperature,
            max_tokens: request.max_output_tokens,
        };

        let response = self
            .client
            .post(self.api_url())
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI-compatible API error ({}): {}", status, error_text);
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let wire_response = response
            .json::<WireResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        wire_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::ParseError("response contained no choices".to_string()))
    }
}
