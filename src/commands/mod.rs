//! Command parsing and dispatch for sqlchat.
//!
//! Parsing is kept apart from execution so commands can be tested without a
//! database or an LLM.

pub mod handlers;
pub mod help;
pub mod output;
pub mod router;
pub mod tokenizer;

pub use handlers::{execute, submit};
pub use output::CommandOutput;
pub use router::{Command, CommandRouter, ConnectArgs};
pub use tokenizer::Token;
