//! The sqlchat error type.
//!
//! Library code returns [`SqlChatError`] and propagates it with `?`. The
//! question pipeline never surfaces these to the transcript; it turns them
//! into an `AskOutcome` and logs the message. Commands show them in the chat.

use thiserror::Error;

/// Everything that can go wrong while chatting with a database.
#[derive(Error, Debug)]
pub enum SqlChatError {
    /// Opening a database failed: unreachable MySQL host, rejected
    /// credentials, a SQLite file that does not exist.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement or schema read failed on an open connection.
    #[error("Query error: {0}")]
    Query(String),

    /// A chat-completion call failed or its provider had no API key.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Bad config file, connection string, connect-form key or model name.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Terminal or stdio failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SqlChatError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Heading printed before the message when the process exits on an error.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Llm(_) => "LLM Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

pub type Result<T> = std::result::Result<T, SqlChatError>;
