//! OpenAI LLM client implementation.
//!
//! Implements the LlmClient trait for OpenAI-compatible chat-completion APIs.
//! The same client serves Groq, which exposes the identical wire format.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SqlChatError};
use crate::llm::types::Message;
use crate::llm::LlmClient;

/// OpenAI API base URL.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible client configuration.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication. Checked when a request is made.
    pub api_key: Option<String>,
    /// Model to use (e.g., "gpt-3.5-turbo").
    pub model: String,
    /// Chat-completions endpoint.
    pub endpoint: String,
    /// Provider name used in error messages.
    pub provider_name: &'static str,
    /// Environment variable the key is read from, for error messages.
    pub key_env: &'static str,
    /// Request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
}

impl OpenAiConfig {
    /// Creates a config for OpenAI with the given API key and model.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            endpoint: OPENAI_API_URL.to_string(),
            provider_name: "OpenAI",
            key_env: "OPENAI_API_KEY",
            timeout: None,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Points the client at another OpenAI-compatible endpoint.
    pub fn with_endpoint(
        mut self,
        endpoint: impl Into<String>,
        provider_name: &'static str,
        key_env: &'static str,
    ) -> Self {
        self.endpoint = endpoint.into();
        self.provider_name = provider_name;
        self.key_env = key_env;
        self
    }
}

/// OpenAI-compatible LLM client.
///
/// Every request uses temperature 0. There is no retry.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SqlChatError::llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Returns the configured model name.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Converts internal messages to OpenAI API format.
    fn convert_messages(messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|m| OpenAiMessage {
                role: m.role.as_str().to_string(),
                content: m.content.clone(),
            })
            .collect()
    }

    fn build_request(&self, messages: &[Message]) -> OpenAiRequest {
        OpenAiRequest {
            model: self.config.model.clone(),
            messages: Self::convert_messages(messages),
            temperature: 0.0,
            stream: false,
        }
    }

    /// Parses an API error response.
    fn parse_error(&self, status: reqwest::StatusCode, body: &str) -> SqlChatError {
        let provider = self.config.provider_name;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return SqlChatError::llm(format!(
                "Authentication failed. Check your {}.",
                self.config.key_env
            ));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return SqlChatError::llm(format!(
                "Rate limited by {provider}. Please wait and try again."
            ));
        }

        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            return SqlChatError::llm(format!(
                "{provider} API error: {}",
                error_response.error.message
            ));
        }

        SqlChatError::llm(format!("{provider} API error ({}): {}", status, body))
    }

    fn map_request_error(&self, error: reqwest::Error) -> SqlChatError {
        if error.is_timeout() {
            SqlChatError::llm("Request timed out. Try again.")
        } else if error.is_connect() {
            SqlChatError::llm(format!(
                "Failed to connect to {} API. Check your network.",
                self.config.provider_name
            ))
        } else {
            SqlChatError::llm(format!("Request failed: {}", error))
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            SqlChatError::llm(format!(
                "No API key configured. Set {} in the environment or .env file.",
                self.config.key_env
            ))
        })?;

        let request = self.build_request(messages);

        debug!(
            "{} request: model={}, messages={}",
            self.config.provider_name,
            self.config.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SqlChatError::llm(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(self.parse_error(status, &body));
        }

        parse_completion(&body, self.config.provider_name)
    }
}

/// Extracts the first choice's content from a completion response body.
fn parse_completion(body: &str, provider: &str) -> Result<String> {
    let response: OpenAiResponse = serde_json::from_str(body)
        .map_err(|e| SqlChatError::llm(format!("Failed to parse response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| SqlChatError::llm(format!("No response from {provider}")))
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiError,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: String,
}
