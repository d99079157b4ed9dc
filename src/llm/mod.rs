//! LLM integration for sqlchat.
//!
//! Provides the client trait, the selectable models and the two generation
//! chains (question to SQL, result to answer).

pub mod chain;
pub mod factory;
pub mod groq;
pub mod mock;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod types;

pub use chain::{generate_answer, generate_sql};
pub use factory::create_client;
pub use groq::GroqClient;
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::{AnswerGeneration, SqlGeneration};
pub use types::{Message, Role};

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// Returns the complete response as a single string.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    /// Groq's OpenAI-compatible endpoint (Llama, Mixtral, Gemma)
    #[default]
    Groq,
    /// OpenAI (GPT-3.5, GPT-4)
    OpenAi,
    /// Mock client for testing (no API key required)
    Mock,
}

impl LlmProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
            Self::Mock => "mock",
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A model choice, resolved once into the provider that serves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSelector {
    /// A model served by OpenAI.
    OpenAi(String),
    /// A model served by Groq.
    Groq(String),
}

impl ModelSelector {
    /// The selectable models, in display order. The first is the default.
    pub const AVAILABLE: [&'static str; 5] = [
        "llama3-8b-8192",
        "mixtral-8x7b-32768",
        "gemma-7b-it",
        "gpt-3.5-turbo",
        "gpt-4-turbo",
    ];

    /// Resolves a model name to its provider.
    ///
    /// Names outside [`Self::AVAILABLE`] are routed to Groq.
    pub fn resolve(name: &str) -> Self {
        match name {
            "gpt-3.5-turbo" | "gpt-4-turbo" => Self::OpenAi(name.to_string()),
            "llama3-8b-8192" | "mixtral-8x7b-32768" | "gemma-7b-it" => {
                Self::Groq(name.to_string())
            }
            other => {
                warn!("Unknown model '{other}', routing to Groq");
                Self::Groq(other.to_string())
            }
        }
    }

    /// Returns true if `name` is one of the selectable models.
    pub fn is_known(name: &str) -> bool {
        Self::AVAILABLE.contains(&name)
    }

    /// Returns the model name.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(model) | Self::Groq(model) => model,
        }
    }

    /// Returns the provider serving this model.
    pub fn provider(&self) -> LlmProvider {
        match self {
            Self::OpenAi(_) => LlmProvider::OpenAi,
            Self::Groq(_) => LlmProvider::Groq,
        }
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::resolve(Self::AVAILABLE[0])
    }
}

impl std::fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.model(), self.provider())
    }
}
