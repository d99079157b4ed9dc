//! Conversation state for one session.
//!
//! An append-only list of Human/AI turns seeded with the assistant greeting.
//! Nothing is persisted; the conversation lives as long as the session.

use std::fmt;

/// The greeting every conversation starts with.
pub const GREETING: &str = "Hello, I'am your SQL Assistant. Ask me anything about your database?";

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    /// The user.
    Human,
    /// The assistant.
    Ai,
}

impl TurnRole {
    /// Returns the role tag shown next to each turn.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "Human",
            Self::Ai => "AI",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    /// Who produced the turn.
    pub role: TurnRole,
    /// The turn's text.
    pub content: String,
}

impl ConversationTurn {
    /// Creates a new turn.
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a Human turn.
    pub fn human(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Human, content)
    }

    /// Creates an AI turn.
    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Ai, content)
    }
}

impl fmt::Display for ConversationTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.content)
    }
}

/// Ordered Human/AI turns.
#[derive(Debug, Clone)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    /// Creates a conversation containing only the greeting.
    pub fn new() -> Self {
        Self {
            turns: vec![ConversationTurn::ai(GREETING)],
        }
    }

    /// Appends a turn.
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Returns every turn, oldest first.
    pub fn as_context(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Returns the most recent `window` turns, or all of them when unset.
    ///
    /// The window never drops below one turn, so the latest question is
    /// always part of the context.
    pub fn recent(&self, window: Option<usize>) -> &[ConversationTurn] {
        match window {
            Some(n) => {
                let keep = n.max(1).min(self.turns.len());
                &self.turns[self.turns.len() - keep..]
            }
            None => &self.turns,
        }
    }

    /// Returns the number of turns, including the greeting.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false; the greeting is never removed.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Returns the latest turn.
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_has_greeting() {
        let conversation = Conversation::new();
        assert_eq!(conversation.len(), 1);
        assert_eq!(
            conversation.as_context()[0],
            ConversationTurn::ai(GREETING)
        );
        assert!(!conversation.is_empty());
    }

    #[test]
    fn test_append_keeps_order() {
        let mut conversation = Conversation::new();
        conversation.append(ConversationTurn::human("Name 3 artists"));
        conversation.append(ConversationTurn::ai("AC/DC, Accept, Aerosmith"));

        let roles: Vec<TurnRole> = conversation.as_context().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![TurnRole::Ai, TurnRole::Human, TurnRole::Ai]);
        assert_eq!(conversation.last().unwrap().content, "AC/DC, Accept, Aerosmith");
    }

    #[test]
    fn test_recent_window() {
        let mut conversation = Conversation::new();
        for i in 0..5 {
            conversation.append(ConversationTurn::human(format!("q{i}")));
        }

        assert_eq!(conversation.recent(None).len(), 6);
        assert_eq!(conversation.recent(Some(100)).len(), 6);

        let recent = conversation.recent(Some(2));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "q3");
        assert_eq!(recent[1].content, "q4");

        // The stored conversation is untouched
        assert_eq!(conversation.len(), 6);
    }

    #[test]
    fn test_zero_window_keeps_latest_turn() {
        let mut conversation = Conversation::new();
        conversation.append(ConversationTurn::human("Name 3 artists"));

        let recent = conversation.recent(Some(0));
        assert_eq!(recent, &[ConversationTurn::human("Name 3 artists")]);
    }

    #[test]
    fn test_turn_display() {
        assert_eq!(ConversationTurn::human("hi").to_string(), "Human: hi");
        assert_eq!(ConversationTurn::ai("hello").to_string(), "AI: hello");
    }
}
