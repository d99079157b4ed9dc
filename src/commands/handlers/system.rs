//! System command handlers (/help, /schema, /sql, /quit).

use crate::commands::help::HELP_TEXT;
use crate::commands::output::CommandOutput;
use crate::session::Session;

/// Handle /help command.
pub fn handle_help() -> CommandOutput {
    CommandOutput::info(HELP_TEXT)
}

/// Handle /schema command.
pub async fn handle_schema(session: &Session) -> CommandOutput {
    match session.schema_text().await {
        Ok(text) => CommandOutput::Info(text),
        Err(e) => CommandOutput::Error(e.to_string()),
    }
}

/// Handle /sql command.
pub fn handle_sql(session: &Session) -> CommandOutput {
    match session.last_sql() {
        Some(sql) => CommandOutput::info(format!("Last generated SQL:\n{sql}")),
        None => CommandOutput::info("No SQL has been generated yet. Ask a question first."),
    }
}

/// Handle /quit or /exit command.
pub fn handle_quit() -> CommandOutput {
    CommandOutput::Exit
}

/// Handle unknown command.
pub fn handle_unknown(command: &str) -> CommandOutput {
    CommandOutput::error(format!(
        "Unknown command: {}. Type /help for available commands.",
        command
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::handlers::tests::chinook_session;
    use crate::config::{ApiKeys, Config};

    #[tokio::test]
    async fn test_schema_lists_tables() {
        let session = chinook_session().await;
        let output = handle_schema(&session).await;
        assert!(matches!(output, CommandOutput::Info(text) if text.contains("Artist")));
    }

    #[tokio::test]
    async fn test_schema_without_connection() {
        let session = Session::new(&Config::default(), ApiKeys::default(), true).unwrap();
        assert!(matches!(
            handle_schema(&session).await,
            CommandOutput::Error(msg) if msg.contains("/connect")
        ));
    }

    #[tokio::test]
    async fn test_sql_shows_last_generated_query() {
        let mut session = chinook_session().await;
        assert!(matches!(
            handle_sql(&session),
            CommandOutput::Info(msg) if msg.starts_with("No SQL")
        ));

        session.ask("Name 5 artists").await;

        assert_eq!(
            handle_sql(&session),
            CommandOutput::info("Last generated SQL:\nSELECT Name FROM Artist LIMIT 5;")
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            handle_unknown("/foo"),
            CommandOutput::error("Unknown command: /foo. Type /help for available commands.")
        );
    }
}
