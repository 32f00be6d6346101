//! Event handling for the TUI.
//!
//! Processes keyboard and terminal events using crossterm.

use crate::error::{ConsoleError, Result};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;

/// Application events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// Nothing happened within the tick rate.
    Tick,
}

impl Event {
    /// Converts a crossterm event. Key releases map to `Tick`.
    pub fn from_crossterm(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Self::Key(key),
            CrosstermEvent::Resize(width, height) => Self::Resize(width, height),
            _ => Self::Tick,
        }
    }
}

/// Polls the terminal for events.
#[derive(Debug, Clone, Copy)]
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Creates a new event handler with default tick rate.
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(100),
        }
    }

    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Blocks for up to one tick waiting for the next event.
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)
            .map_err(|e| ConsoleError::internal(format!("Failed to poll events: {e}")))?
        {
            let event = event::read()
                .map_err(|e| ConsoleError::internal(format!("Failed to read event: {e}")))?;
            Ok(Event::from_crossterm(event))
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
