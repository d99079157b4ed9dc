//! Help text constants for sqlchat commands.

/// Help text displayed for the /help command.
pub const HELP_TEXT: &str = r#"Type a question about your database, or one of:
  /connect [key=value...]  - Connect using the settings form
                             keys: backend host port user password database
  /connect <url>           - Connect with mysql://... or sqlite://...
  /model [name]            - Show or switch the LLM model
  /models                  - List selectable models
  /schema                  - Display database schema
  /sql                     - Show the SQL generated for the last question
  /help                    - Show this help message
  /quit, /exit             - Exit the application

Keyboard shortcuts:
  Ctrl+C          - Exit application
  Enter           - Submit input
  Esc             - Clear input
  Page Up/Down    - Scroll chat"#;
