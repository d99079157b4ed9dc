//! Header widget for the TUI.
//!
//! Displays the application name, connection status and selected model.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Header bar widget.
pub struct Header<'a> {
    connection_info: Option<&'a str>,
    model: &'a str,
    thinking: bool,
}

impl<'a> Header<'a> {
    /// Creates a new header widget. `connection_info` is `None` when disconnected.
    pub fn new(connection_info: Option<&'a str>, model: &'a str, thinking: bool) -> Self {
        Self {
            connection_info,
            model,
            thinking,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        // Left side: app name and version
        let left_text = format!(" sqlchat v{}", env!("CARGO_PKG_VERSION"));
        let left_width = left_text.chars().count() as u16;
        let left_span = Span::styled(left_text, style);
        buf.set_span(area.x, area.y, &left_span, area.width);

        if self.thinking {
            buf.set_string(area.x + left_width + 2, area.y, "Thinking…", style.fg(Color::Yellow));
        }

        // Right side: connection status dot, database and model
        let (status_dot, status_color, info) = match self.connection_info {
            Some(info) => ("●", Color::Green, info),
            None => ("○", Color::Gray, "not connected"),
        };
        let status_style = Style::default().bg(Color::Blue).fg(status_color);

        let db_text = format!(" [db: {}] [model: {}] ", info, self.model);
        let right_width = 2 + db_text.chars().count() as u16;
        if right_width < area.width {
            let right_x = area.right().saturating_sub(right_width);
            buf.set_string(right_x, area.y, " ", style);
            buf.set_string(right_x + 1, area.y, status_dot, status_style);
            buf.set_string(right_x + 2, area.y, &db_text, style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(header: Header<'_>) -> String {
        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        header.render(area, &mut buf);
        (0..area.width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_header_connected() {
        let line = render(Header::new(Some("Chinook @ localhost:3306"), "llama3-8b-8192", false));
        assert!(line.starts_with(" sqlchat v"));
        assert!(line.contains("● [db: Chinook @ localhost:3306] [model: llama3-8b-8192]"));
    }

    #[test]
    fn test_header_disconnected_and_thinking() {
        let line = render(Header::new(None, "gpt-4-turbo", true));
        assert!(line.contains("○ [db: not connected]"));
        assert!(line.contains("Thinking…"));
    }
}
