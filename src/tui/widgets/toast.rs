//! Toast notification widget for the TUI.
//!
//! Displays temporary messages that auto-dismiss.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Toast notification widget.
pub struct Toast<'a> {
    message: &'a str,
}

impl<'a> Toast<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }

    /// Calculates the area for the toast (bottom-right corner).
    pub fn area(screen: Rect) -> Rect {
        let width = 40.min(screen.width.saturating_sub(4));
        let height = 3;
        let x = screen.width.saturating_sub(width + 2);
        let y = screen.height.saturating_sub(height + 1);
        Rect::new(x, y, width, height)
    }

    fn fit(message: &str, max_len: usize) -> String {
        if message.chars().count() > max_len {
            let head: String = message.chars().take(max_len.saturating_sub(1)).collect();
            format!("{head}…")
        } else {
            message.to_string()
        }
    }
}

impl Widget for Toast<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .style(Style::default().bg(Color::Black));

        let inner = block.inner(area);
        block.render(area, buf);

        let line = Line::from(vec![Span::styled(
            Self::fit(self.message, inner.width as usize),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )]);

        Paragraph::new(line).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_area() {
        let screen = Rect::new(0, 0, 80, 24);
        let area = Toast::area(screen);
        assert!(area.x > 0);
        assert!(area.y > 0);
        assert_eq!(area.height, 3);
    }

    #[test]
    fn test_fit_truncates_by_chars() {
        assert_eq!(Toast::fit("short", 10), "short");
        assert_eq!(Toast::fit("àbcdéfgh", 5), "àbcd…");
    }
}
