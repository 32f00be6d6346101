//! Header widget for the TUI.
//!
//! Displays the application name, an activity spinner, and the service
//! address with the active database.

use super::spinner::Spinner;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Header bar widget.
pub struct Header<'a> {
    service_info: &'a str,
    active_database: Option<&'a str>,
    spinner: Option<&'a Spinner>,
}

impl<'a> Header<'a> {
    /// Creates a new header widget.
    pub fn new(
        service_info: &'a str,
        active_database: Option<&'a str>,
        spinner: Option<&'a Spinner>,
    ) -> Self {
        Self {
            service_info,
            active_database,
            spinner,
        }
    }

    fn right_text(&self) -> String {
        format!(
            " {} [db: {}] ",
            self.service_info,
            self.active_database.unwrap_or("none")
        )
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" querydesk v{}", env!("CARGO_PKG_VERSION"));
        buf.set_span(area.x, area.y, &Span::styled(left_text, style), area.width);

        if let Some(spinner) = self.spinner {
            let spinner_text = spinner.display();
            let spinner_style = style.fg(Color::Yellow);
            let spinner_width = spinner_text.chars().count() as u16;
            let spinner_x = area.x + (area.width.saturating_sub(spinner_width)) / 2;
            buf.set_string(spinner_x, area.y, &spinner_text, spinner_style);
        }

        let right_text = self.right_text();
        let right_width = right_text.chars().count() as u16;
        if right_width < area.width {
            let right_x = area.right().saturating_sub(right_width);
            let db_style = if self.active_database.is_some() {
                style
            } else {
                style.fg(Color::Gray)
            };
            buf.set_string(right_x, area.y, &right_text, db_style);
        }
    }
}
