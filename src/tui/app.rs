//! Application state for the TUI.
//!
//! Contains the main App struct and related types for managing UI state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::commands::CommandOutput;
use crate::conversation::ConversationTurn;
use crate::session::Session;

/// Lines scrolled by PageUp/PageDown.
const PAGE_SCROLL: usize = 10;

/// A message in the chat panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    /// A conversation turn.
    Turn(ConversationTurn),
    /// Command output (help, schema, connect status).
    System(String),
    /// An error message.
    Error(String),
}

impl ChatMessage {
    /// Returns the message type as a string for display purposes.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Turn(turn) => turn.role.as_str(),
            Self::System(_) => "System",
            Self::Error(_) => "Error",
        }
    }

    /// Returns the message body.
    pub fn text(&self) -> &str {
        match self {
            Self::Turn(turn) => &turn.content,
            Self::System(text) | Self::Error(text) => text,
        }
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run this input through the session.
    Submit(String),
    /// Leave the application.
    Quit,
}

/// Input state for text editing.
///
/// `cursor` counts characters, not bytes.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position (character index).
    pub cursor: usize,
}

impl InputState {
    /// Creates a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.text
            .char_indices()
            .nth(cursor)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Moves the cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor to the start of the input.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to the end of the input.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Clears the input and returns the previous text.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    /// Returns true if the input is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    /// Input field state.
    pub input: InputState,
    /// Chat messages.
    pub messages: Vec<ChatMessage>,
    /// Chat scroll offset (lines from bottom).
    pub chat_scroll: usize,
    /// Set while a submitted input is being processed.
    pub thinking: bool,
    /// The question being processed, shown until its turns arrive.
    pub pending_question: Option<String>,
}

impl App {
    /// Creates a new App showing the session's conversation so far.
    pub fn new(session: &Session) -> Self {
        let messages = session
            .conversation()
            .as_context()
            .iter()
            .cloned()
            .map(ChatMessage::Turn)
            .collect();

        Self {
            running: true,
            input: InputState::new(),
            messages,
            chat_scroll: 0,
            thinking: false,
            pending_question: None,
        }
    }

    /// Adds a message to the chat.
    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
        // Auto-scroll to bottom when new message is added
        self.chat_scroll = 0;
    }

    /// Marks `input` as being processed.
    pub fn begin(&mut self, input: &str) {
        self.thinking = true;
        self.chat_scroll = 0;
        if !input.trim_start().starts_with('/') {
            self.pending_question = Some(input.trim().to_string());
        }
    }

    /// Shows the result of one submitted input.
    pub fn apply_output(&mut self, output: CommandOutput, session: &Session) {
        self.thinking = false;
        self.pending_question = None;

        match output {
            CommandOutput::Asked(_) => {
                // The question and its reply are the last two turns
                let turns = session.conversation().as_context();
                for turn in &turns[turns.len().saturating_sub(2)..] {
                    self.add_message(ChatMessage::Turn(turn.clone()));
                }
            }
            CommandOutput::Info(text) => self.add_message(ChatMessage::System(text)),
            CommandOutput::Error(text) => self.add_message(ChatMessage::Error(text)),
            CommandOutput::None => {}
            CommandOutput::Exit => self.running = false,
        }
    }

    /// Returns the number of conversation turns shown.
    pub fn turn_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m, ChatMessage::Turn(_)))
            .count()
    }

    /// Handles a key press and returns the action it triggers, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }

        match key.code {
            KeyCode::Enter => self.submit_input().map(Action::Submit),
            KeyCode::Esc => {
                self.input.take();
                None
            }
            KeyCode::PageUp => {
                self.chat_scroll = self.chat_scroll.saturating_add(PAGE_SCROLL);
                None
            }
            KeyCode::PageDown => {
                self.chat_scroll = self.chat_scroll.saturating_sub(PAGE_SCROLL);
                None
            }
            KeyCode::Char(c) => {
                self.input.insert(c);
                None
            }
            KeyCode::Backspace => {
                self.input.backspace();
                None
            }
            KeyCode::Delete => {
                self.input.delete();
                None
            }
            KeyCode::Left => {
                self.input.move_left();
                None
            }
            KeyCode::Right => {
                self.input.move_right();
                None
            }
            KeyCode::Home => {
                self.input.move_home();
                None
            }
            KeyCode::End => {
                self.input.move_end();
                None
            }
            _ => None,
        }
    }

    /// Submits the current input for processing. Blank input is discarded.
    pub fn submit_input(&mut self) -> Option<String> {
        let text = self.input.take();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}
