//! Terminal User Interface for sqlchat.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
mod ui;
pub mod widgets;

pub use app::{Action, App, ChatMessage};
pub use events::{Event, EventHandler};

use crate::commands::{self, CommandOutput};
use crate::error::{Result, SqlChatError};
use crate::session::Session;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tracing::debug;

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;

        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| SqlChatError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| {
            SqlChatError::internal(format!("Failed to enter alternate screen: {e}"))
        })?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)
            .map_err(|e| SqlChatError::internal(format!("Failed to create terminal: {e}")))?;

        Ok(terminal)
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| SqlChatError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).map_err(|e| {
            SqlChatError::internal(format!("Failed to leave alternate screen: {e}"))
        })?;

        self.terminal
            .show_cursor()
            .map_err(|e| SqlChatError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the main event loop until the user quits.
    ///
    /// `startup` is shown in the chat before the first input, e.g. the
    /// result of a `--connect` at launch.
    pub async fn run(&mut self, session: &mut Session, startup: Option<CommandOutput>) -> Result<()> {
        // Set up panic hook to restore terminal on panic
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let mut app = App::new(session);
        if let Some(output) = startup {
            app.apply_output(output, session);
        }

        let result = self.run_event_loop(&mut app, session).await;

        // Restore panic hook
        let _ = panic::take_hook();

        result
    }

    /// The main event loop, separated for cleaner error handling.
    async fn run_event_loop(&mut self, app: &mut App, session: &mut Session) -> Result<()> {
        while app.running {
            self.draw(app, session)?;

            let Event::Key(key) = self.event_handler.next()? else {
                continue;
            };

            match app.handle_key(key) {
                Some(Action::Submit(input)) => {
                    // Each input runs to completion; draw the indicator first
                    app.begin(&input);
                    self.draw(app, session)?;

                    debug!("Submitting input");
                    let output = commands::submit(session, &input).await;
                    app.apply_output(output, session);
                }
                Some(Action::Quit) => app.running = false,
                None => {}
            }
        }

        Ok(())
    }

    fn draw(&mut self, app: &App, session: &Session) -> Result<()> {
        self.terminal
            .draw(|frame| ui::render(frame, app, session))
            .map_err(|e| SqlChatError::internal(format!("Failed to draw: {e}")))?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
