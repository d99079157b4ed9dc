//! Sidebar widget for the TUI.
//!
//! Shows the connect form values and the selected model.

use crate::config::ConnectionConfig;
use crate::db::DatabaseBackend;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

/// Settings sidebar widget.
pub struct Sidebar<'a> {
    form: &'a ConnectionConfig,
    model: &'a str,
    provider: &'a str,
    connected: bool,
}

impl<'a> Sidebar<'a> {
    /// Creates a new sidebar widget.
    pub fn new(form: &'a ConnectionConfig, model: &'a str, provider: &'a str, connected: bool) -> Self {
        Self {
            form,
            model,
            provider,
            connected,
        }
    }

    fn field(label: &'a str, value: String) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("{label:<9}"), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ])
    }

    fn heading(text: &'a str) -> Line<'a> {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let form = self.form;
        let mut lines = vec![
            Self::heading("Connection"),
            Self::field("Backend", form.backend.to_string()),
        ];

        if form.backend == DatabaseBackend::MySql {
            lines.push(Self::field("Host", form.host.clone()));
            lines.push(Self::field("Port", form.port.clone()));
            lines.push(Self::field("User", form.user.clone()));
            lines.push(Self::field("Password", "*".repeat(form.password.chars().count())));
        }
        lines.push(Self::field("Database", form.database.clone()));

        let (status, color) = if self.connected {
            ("Connected", Color::Green)
        } else {
            ("Not connected", Color::Gray)
        };
        lines.push(Line::from(Span::styled(status, Style::default().fg(color))));
        lines.push(Line::from(""));

        lines.push(Self::heading("Model"));
        lines.push(Self::field("Name", self.model.to_string()));
        lines.push(Self::field("Provider", self.provider.to_string()));
        lines.push(Line::from(""));

        lines.push(Line::from(Span::styled(
            "/connect key=value",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "/model <name>",
            Style::default().fg(Color::DarkGray),
        )));

        lines
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Settings ");

        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
