//! Application state for the TUI.
//!
//! Wraps the [`Console`] with view-only state: focus, scroll offsets and the
//! toast notification. Key bindings are translated into console actions here.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use super::widgets::spinner::Spinner;
use super::Event;
use crate::console::{Console, ExecuteOutcome, Template};

/// How long a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Which panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Results,
    Sidebar,
}

impl Focus {
    /// Cycles to the next focus panel.
    pub fn next(self) -> Self {
        match self {
            Self::Editor => Self::Results,
            Self::Results => Self::Sidebar,
            Self::Sidebar => Self::Editor,
        }
    }
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    /// Current focus panel.
    pub focus: Focus,
    /// The query-lifecycle controller.
    pub console: Console,
    /// Service address shown in the header.
    pub service_info: String,
    /// Result panel scroll offset (lines from top).
    pub result_scroll: usize,
    /// Sidebar scroll offset.
    pub sidebar_scroll: usize,
    /// Activity indicator shown in the header while a request runs.
    pub spinner: Option<Spinner>,
    toast: Option<(String, Instant)>,
}

impl App {
    pub fn new(console: Console, service_info: impl Into<String>) -> Self {
        Self {
            running: true,
            focus: Focus::default(),
            console,
            service_info: service_info.into(),
            result_scroll: 0,
            sidebar_scroll: 0,
            spinner: None,
            toast: None,
        }
    }

    /// Shows a temporary notification.
    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some((message.into(), Instant::now()));
    }

    pub fn toast(&self) -> Option<&str> {
        self.toast.as_ref().map(|(message, _)| message.as_str())
    }

    pub fn clear_expired_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_DURATION)
        {
            self.toast = None;
        }
    }

    /// Picks up requests the console raised while applying actions or
    /// completions.
    pub fn sync(&mut self) {
        if self.console.take_focus_request() {
            self.focus = Focus::Editor;
        }

        let wanted = if self.console.is_busy() {
            Some("Executing")
        } else if self.console.is_analyzing() {
            Some("Analyzing")
        } else {
            None
        };
        if self.spinner.as_ref().map(Spinner::label) != wanted {
            self.spinner = wanted.map(Spinner::new);
        }
    }

    /// Handles an event and updates application state.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            // Layout is recomputed on every draw.
            Event::Resize(_, _) | Event::Tick => {}
        }
        self.sync();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.running = false;
            }
            KeyCode::F(5) => self.execute(),
            KeyCode::Char('e') if ctrl => self.execute(),
            KeyCode::F(6) => self.console.analyze(),
            KeyCode::Char('l') if ctrl => {
                self.console.clear();
                self.result_scroll = 0;
            }
            KeyCode::Char(c) if alt => {
                if let Some(template) = Template::from_shortcut(c) {
                    self.console.load_template(template);
                    self.focus = Focus::Editor;
                }
            }
            KeyCode::Esc => self.console.dismiss_suggestions(),
            KeyCode::Tab => {
                if !(self.focus == Focus::Editor && self.console.apply_selected_suggestion()) {
                    self.focus = self.focus.next();
                }
            }
            _ => match self.focus {
                Focus::Editor => self.handle_editor_key(key),
                Focus::Results => {
                    Self::scroll(&mut self.result_scroll, key.code);
                }
                Focus::Sidebar => {
                    Self::scroll(&mut self.sidebar_scroll, key.code);
                }
            },
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        if self.console.suggestions().is_visible() {
            match key.code {
                KeyCode::Up => return self.console.select_previous_suggestion(),
                KeyCode::Down => return self.console.select_next_suggestion(),
                _ => {}
            }
        }

        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return;
        }

        match key.code {
            KeyCode::Char(c) => self.console.edit(|b| b.insert(c)),
            KeyCode::Enter => self.console.edit(|b| b.insert('\n')),
            KeyCode::Backspace => self.console.edit(|b| b.backspace()),
            KeyCode::Delete => self.console.edit(|b| b.delete()),
            KeyCode::Left => self.console.edit(|b| b.move_left()),
            KeyCode::Right => self.console.edit(|b| b.move_right()),
            KeyCode::Home => self.console.edit(|b| b.move_home()),
            KeyCode::End => self.console.edit(|b| b.move_end()),
            _ => {}
        }
    }

    fn scroll(offset: &mut usize, code: KeyCode) {
        match code {
            KeyCode::Up => *offset = offset.saturating_sub(1),
            KeyCode::Down => *offset = offset.saturating_add(1),
            KeyCode::PageUp => *offset = offset.saturating_sub(10),
            KeyCode::PageDown => *offset = offset.saturating_add(10),
            KeyCode::Home => *offset = 0,
            _ => {}
        }
    }

    fn execute(&mut self) {
        match self.console.execute() {
            Ok(ExecuteOutcome::Submitted) => self.result_scroll = 0,
            Ok(ExecuteOutcome::Busy) => debug!("Execute pressed while busy"),
            Err(e) => self.show_toast(e.to_string()),
        }
    }
}
