//! Groq LLM client.
//!
//! Groq serves Llama, Mixtral and Gemma models behind an OpenAI-compatible
//! chat-completions endpoint, so this wraps [`OpenAiClient`].

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::llm::openai::{OpenAiClient, OpenAiConfig};
use crate::llm::types::Message;
use crate::llm::LlmClient;

/// Groq chat-completions endpoint.
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq LLM client.
#[derive(Debug, Clone)]
pub struct GroqClient {
    inner: OpenAiClient,
}

impl GroqClient {
    /// Creates a Groq client for the given model.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let config = OpenAiConfig::new(api_key, model)
            .with_endpoint(GROQ_API_URL, "Groq", "GROQ_API_KEY")
            .with_timeout(timeout);

        Ok(Self {
            inner: OpenAiClient::new(config)?,
        })
    }

    /// Returns the configured model name.
    pub fn model(&self) -> &str {
        self.inner.model()
    }
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.inner.complete(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqlChatError;

    #[test]
    fn test_new_client_keeps_model() {
        let client = GroqClient::new(Some("gsk-test".to_string()), "mixtral-8x7b-32768", None)
            .unwrap();
        assert_eq!(client.model(), "mixtral-8x7b-32768");
    }

    #[tokio::test]
    async fn test_missing_key_names_groq_variable() {
        let client = GroqClient::new(None, "llama3-8b-8192", None).unwrap();
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();

        assert!(matches!(err, SqlChatError::Llm(_)));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }
}
