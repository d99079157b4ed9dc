//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::App;
use super::widgets::{chat, header, input, sidebar};
use crate::session::Session;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App, session: &Session) {
    let area = frame.area();

    // Main layout: header, content, input
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Content (chat + sidebar)
            Constraint::Length(3), // Input
        ])
        .split(area);

    let header_area = main_layout[0];
    let content_area = main_layout[1];
    let input_area = main_layout[2];

    // Content layout: chat (70%) and sidebar (30%)
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(70), // Chat panel
            Constraint::Percentage(30), // Sidebar
        ])
        .split(content_area);

    render_header(frame, header_area, app, session);
    render_chat(frame, content_layout[0], app);
    render_sidebar(frame, content_layout[1], session);
    render_input(frame, input_area, app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, session: &Session) {
    let connection_info = session.connection_config().map(|c| c.display_string());
    let widget = header::Header::new(
        connection_info.as_deref(),
        session.model().model(),
        app.thinking,
    );
    frame.render_widget(widget, area);
}

fn render_chat(frame: &mut Frame, area: Rect, app: &App) {
    let widget = chat::ChatPanel::new(&app.messages, app.chat_scroll, app.thinking)
        .pending_question(app.pending_question.as_deref());
    frame.render_widget(widget, area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, session: &Session) {
    let widget = sidebar::Sidebar::new(
        session.form(),
        session.model().model(),
        session.provider().as_str(),
        session.is_connected(),
    );
    frame.render_widget(widget, area);
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let enabled = !app.thinking;
    let widget = input::InputBar::new(&app.input.text, app.input.cursor, enabled);
    frame.render_widget(widget, area);

    if enabled {
        // Account for border (1) and prompt "> " (2)
        let available_width = area.width.saturating_sub(5) as usize;
        let visible_cursor =
            app.input.cursor - input::calculate_scroll_offset(app.input.cursor, available_width);
        let cursor_x = area.x + 1 + 2 + visible_cursor as u16;
        let cursor_y = area.y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}
