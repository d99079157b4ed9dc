//! Chat panel widget for the TUI.
//!
//! Displays the conversation turns and command output, newest at the bottom.

use crate::conversation::TurnRole;
use crate::tui::app::ChatMessage;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Chat panel widget.
pub struct ChatPanel<'a> {
    messages: &'a [ChatMessage],
    scroll: usize,
    thinking: bool,
    pending_question: Option<&'a str>,
}

impl<'a> ChatPanel<'a> {
    /// Creates a new chat panel widget.
    ///
    /// `scroll` is the number of lines scrolled up from the bottom.
    pub fn new(messages: &'a [ChatMessage], scroll: usize, thinking: bool) -> Self {
        Self {
            messages,
            scroll,
            thinking,
            pending_question: None,
        }
    }

    /// Shows a question that has no turns yet.
    pub fn pending_question(mut self, question: Option<&'a str>) -> Self {
        self.pending_question = question;
        self
    }

    fn label_style(message: &ChatMessage) -> Style {
        let color = match message {
            ChatMessage::Turn(turn) if turn.role == TurnRole::Human => Color::Cyan,
            ChatMessage::Turn(_) => Color::Green,
            ChatMessage::System(_) => Color::Yellow,
            ChatMessage::Error(_) => Color::Red,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();

        for message in self.messages {
            lines.push(Line::from(Span::styled(
                format!("{}:", message.type_label()),
                Self::label_style(message),
            )));
            let body_style = match message {
                ChatMessage::Error(_) => Style::default().fg(Color::Red),
                _ => Style::default(),
            };
            for text in message.text().lines() {
                lines.push(Line::from(Span::styled(text, body_style)));
            }
            lines.push(Line::from(""));
        }

        if let Some(question) = self.pending_question {
            lines.push(Line::from(Span::styled(
                format!("{}:", TurnRole::Human),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )));
            lines.extend(question.lines().map(Line::from));
            lines.push(Line::from(""));
        }

        if self.thinking {
            lines.push(Line::from(Span::styled(
                "Thinking…",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        lines
    }
}

/// Estimates rendered rows for `lines` wrapped at `width` columns.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| line.width().div_ceil(width).max(1))
        .sum()
}

/// Returns the top offset that shows the bottom of the chat, moved up by `scroll`.
pub fn scroll_offset(total: usize, visible: usize, scroll: usize) -> usize {
    total.saturating_sub(visible).saturating_sub(scroll)
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Chat ");

        let inner = block.inner(area);
        let lines = self.lines();
        let total = wrapped_height(&lines, inner.width);
        let offset = scroll_offset(total, usize::from(inner.height), self.scroll);

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0))
            .render(area, buf);
    }
}
