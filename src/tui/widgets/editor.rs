//! Multi-line SQL editor widget.

use crate::console::QueryBuffer;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Calculates the scroll offset needed to keep the cursor visible.
///
/// Returns how many characters (or lines) to skip from the start.
pub fn calculate_scroll_offset(cursor: usize, available: usize) -> usize {
    if available == 0 {
        return cursor;
    }
    if cursor < available {
        0
    } else {
        cursor + 1 - available
    }
}

/// Editor panel showing the query buffer.
pub struct Editor<'a> {
    buffer: &'a QueryBuffer,
    focused: bool,
}

impl<'a> Editor<'a> {
    pub fn new(buffer: &'a QueryBuffer, focused: bool) -> Self {
        Self { buffer, focused }
    }

    /// Returns the (line, column) scroll offsets for an editor of `area`.
    fn offsets(&self, area: Rect) -> (usize, usize) {
        let (line, column) = self.buffer.cursor_position();
        let width = area.width.saturating_sub(2) as usize;
        let height = area.height.saturating_sub(2) as usize;
        (
            calculate_scroll_offset(line, height),
            calculate_scroll_offset(column, width),
        )
    }

    /// Screen position of the text cursor when the editor occupies `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let (line, column) = self.buffer.cursor_position();
        let (top, left) = self.offsets(area);
        let x = area.x + 1 + (column - left) as u16;
        let y = area.y + 1 + (line - top) as u16;
        (x, y)
    }
}

impl Widget for Editor<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" SQL ");

        if self.buffer.text().is_empty() {
            let hint = Paragraph::new(Line::styled(
                "Type a statement, F5 to execute, F6 to analyze",
                Style::default().fg(Color::DarkGray),
            ))
            .block(block);
            hint.render(area, buf);
            return;
        }

        let (top, left) = self.offsets(area);
        let lines: Vec<Line> = self
            .buffer
            .text()
            .split('\n')
            .skip(top)
            .map(|line| Line::raw(line.chars().skip(left).collect::<String>()))
            .collect();

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
