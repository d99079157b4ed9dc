//! Command parsing and routing for sqlchat.
//!
//! Parses user input into structured commands that can be dispatched to handlers.

use super::tokenizer::{tokenize, Token};

/// Arguments for the connect command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectArgs {
    /// Connection string given as a bare word (`mysql://…`, `sqlite://…`).
    pub url: Option<String>,
    /// Form fields to override, in the order given.
    pub fields: Vec<(String, String)>,
}

/// Parsed command with arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Connect using the form, optionally overriding fields.
    Connect(ConnectArgs),
    /// Show the current model, or switch to a new one.
    Model(Option<String>),
    /// List selectable models.
    Models,
    /// Display database schema.
    Schema,
    /// Show the SQL generated for the last question.
    Sql,
    /// Show help message.
    Help,
    /// Exit the application.
    Quit,
    /// Natural language question (not a slash command).
    Question(String),
    /// Unknown command.
    Unknown(String),
}

/// Command router for parsing user input.
pub struct CommandRouter;

impl CommandRouter {
    /// Parse user input into a Command.
    pub fn parse(input: &str) -> Command {
        let input = input.trim();

        if !input.starts_with('/') {
            return Command::Question(input.to_string());
        }

        let (command, args) = match input.split_once(char::is_whitespace) {
            Some((command, args)) => (command.to_lowercase(), args.trim()),
            None => (input.to_lowercase(), ""),
        };

        match command.as_str() {
            "/connect" => Command::Connect(Self::parse_connect_args(args)),
            "/model" => Command::Model(args.split_whitespace().next().map(String::from)),
            "/models" => Command::Models,
            "/schema" => Command::Schema,
            "/sql" => Command::Sql,
            "/help" => Command::Help,
            "/quit" | "/exit" => Command::Quit,
            _ => Command::Unknown(command),
        }
    }

    /// Parse `/connect` arguments using the tokenizer.
    fn parse_connect_args(args: &str) -> ConnectArgs {
        let mut parsed = ConnectArgs::default();

        for token in tokenize(args) {
            match token {
                Token::KeyValue { key, value } => parsed.fields.push((key, value)),
                Token::Word(word) if parsed.url.is_none() => parsed.url = Some(word),
                Token::Word(_) => {}
            }
        }

        parsed
    }
}
