//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use std::time::Duration;

use tracing::debug;

use crate::config::ApiKeys;
use crate::error::Result;
use crate::llm::{GroqClient, LlmClient, LlmProvider, MockLlmClient, OpenAiClient, OpenAiConfig};

/// Creates an LLM client for the given provider and model.
///
/// Keys come from [`ApiKeys`], read once at startup. A missing key does not
/// fail here; the first request reports it.
pub fn create_client(
    provider: LlmProvider,
    model: &str,
    keys: &ApiKeys,
    timeout: Option<Duration>,
) -> Result<Box<dyn LlmClient>> {
    debug!("Creating {provider} client for model {model}");

    match provider {
        LlmProvider::OpenAi => {
            let config = OpenAiConfig::new(keys.openai.clone(), model).with_timeout(timeout);
            Ok(Box::new(OpenAiClient::new(config)?))
        }
        LlmProvider::Groq => Ok(Box::new(GroqClient::new(
            keys.groq.clone(),
            model,
            timeout,
        )?)),
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}
