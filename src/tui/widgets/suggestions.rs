//! Autocomplete popup widget for the TUI.

use crate::console::SuggestionController;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Popup listing the current suggestions below the cursor.
pub struct SuggestionPopup<'a> {
    state: &'a SuggestionController,
}

impl<'a> SuggestionPopup<'a> {
    pub fn new(state: &'a SuggestionController) -> Self {
        Self { state }
    }

    /// Places the popup on the line below `cursor`, kept inside `screen`.
    pub fn popup_area(cursor: (u16, u16), items: &[String], screen: Rect) -> Rect {
        let longest = items.iter().map(|i| i.chars().count()).max().unwrap_or(0) as u16;
        let width = (longest + 4).clamp(20, 50).min(screen.width);
        let height = (items.len() as u16 + 2).min(12).min(screen.height);

        let x = cursor.0.min(screen.right().saturating_sub(width));
        let below = cursor.1 + 1;
        let y = if below + height <= screen.bottom() {
            below
        } else {
            cursor.1.saturating_sub(height)
        };

        Rect::new(x, y, width, height)
    }
}

impl Widget for SuggestionPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(" Suggestions ");

        let inner = block.inner(area);
        block.render(area, buf);

        let selected = self.state.selected();
        let skip = selected.saturating_sub((inner.height as usize).saturating_sub(1));
        for (row, (idx, item)) in self
            .state
            .items()
            .iter()
            .enumerate()
            .skip(skip)
            .take(inner.height as usize)
            .enumerate()
        {
            let style = if idx == selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let marker = if idx == selected { "▸ " } else { "  " };
            let line = Line::from(vec![Span::styled(marker, style), Span::styled(item.as_str(), style)]);
            let line_area = Rect::new(inner.x, inner.y + row as u16, inner.width, 1);
            Paragraph::new(line).style(style).render(line_area, buf);
        }
    }
}
