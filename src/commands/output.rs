//! Transport-agnostic command output types.
//!
//! These types represent command results independently of the front end
//! (TUI or headless). Each front end converts them to its own representation.

use crate::session::AskOutcome;

/// Output from a command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Informational message (success, status, etc.).
    Info(String),

    /// Error message.
    Error(String),

    /// A question ran; its turns are already in the conversation.
    Asked(AskOutcome),

    /// Nothing to show.
    None,

    /// Exit the application.
    Exit,
}

impl CommandOutput {
    /// Creates an info message.
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    /// Creates an error message.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error(msg.into())
    }

    /// Returns true if the front end should stop.
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit)
    }
}
