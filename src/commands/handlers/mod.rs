//! Command handlers for sqlchat.
//!
//! Each handler takes the session and returns a transport-agnostic output.

pub mod connection;
pub mod llm_settings;
pub mod system;

use super::output::CommandOutput;
use super::router::{Command, CommandRouter};
use crate::session::Session;

/// Executes one parsed command against the session.
pub async fn execute(session: &mut Session, command: Command) -> CommandOutput {
    match command {
        Command::Connect(args) => connection::handle_connect(session, args).await,
        Command::Model(None) => llm_settings::handle_model_show(session),
        Command::Model(Some(name)) => llm_settings::handle_model_set(session, &name),
        Command::Models => llm_settings::handle_models(session),
        Command::Schema => system::handle_schema(session).await,
        Command::Sql => system::handle_sql(session),
        Command::Help => system::handle_help(),
        Command::Quit => system::handle_quit(),
        Command::Question(question) => match session.ask(&question).await {
            Some(outcome) => CommandOutput::Asked(outcome),
            None => CommandOutput::None,
        },
        Command::Unknown(command) => system::handle_unknown(&command),
    }
}

/// Parses and executes one line of user input.
pub async fn submit(session: &mut Session, input: &str) -> CommandOutput {
    execute(session, CommandRouter::parse(input)).await
}
