//! Terminal User Interface for querydesk.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
pub mod headless;
mod ui;
pub mod widgets;

pub use app::{App, Focus};
pub use events::{Event, EventHandler};

use crate::api::ApiClient;
use crate::config::Config;
use crate::console::Console;
use crate::error::{ConsoleError, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

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
            .map_err(|e| ConsoleError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture).map_err(|e| {
            ConsoleError::internal(format!("Failed to enter alternate screen: {e}"))
        })?;

        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
            .map_err(|e| ConsoleError::internal(format!("Failed to create terminal: {e}")))
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| ConsoleError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .map_err(|e| ConsoleError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| ConsoleError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the application until the user quits.
    pub async fn run(&mut self, mut app: App) -> Result<()> {
        // Restore the terminal before the default hook prints the panic
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
            original_hook(panic_info);
        }));

        let result = self.run_event_loop(&mut app).await;

        app.console.shutdown();
        let _ = panic::take_hook();

        result
    }

    /// Draws, then waits for either terminal input or a console completion.
    ///
    /// The blocking input poll is kept across iterations so a completion
    /// arriving first never drops a keystroke.
    async fn run_event_loop(&mut self, app: &mut App) -> Result<()> {
        let handler = self.event_handler;
        let mut pending_input: Option<JoinHandle<Result<Event>>> = None;

        loop {
            app.clear_expired_toast();

            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| ConsoleError::internal(format!("Failed to draw: {e}")))?;

            if !app.running {
                break;
            }

            let input = pending_input
                .get_or_insert_with(|| tokio::task::spawn_blocking(move || handler.next()));

            tokio::select! {
                joined = input => {
                    pending_input = None;
                    let event = joined
                        .map_err(|e| ConsoleError::internal(format!("Input task failed: {e}")))??;
                    app.handle_event(event);
                }
                Some(completion) = app.console.next_completion() => {
                    app.console.apply(completion);
                    app.sync();
                }
            }
        }

        debug!("Event loop finished");
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the interactive TUI against `api`.
pub async fn run(config: &Config, api: Arc<dyn ApiClient>) -> Result<()> {
    let mut console = Console::new(api, config.editor.debounce());
    console.start();

    let app = App::new(console, config.api.display_string());
    info!("Starting TUI for {}", app.service_info);

    let mut tui = Tui::new()?;
    tui.run(app).await
}
