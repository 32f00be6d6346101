//! Result panel: status line plus the result table.

use super::table::ResultTable;
use crate::console::{ExecutionResult, ResultView};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct ResultPanel<'a> {
    result: Option<&'a ExecutionResult>,
    busy: bool,
    focused: bool,
    scroll: usize,
}

impl<'a> ResultPanel<'a> {
    pub fn new(result: Option<&'a ExecutionResult>, busy: bool, focused: bool, scroll: usize) -> Self {
        Self {
            result,
            busy,
            focused,
            scroll,
        }
    }

    fn lines(&self, width: usize) -> Vec<Line<'static>> {
        let Some(result) = self.result else {
            let hint = if self.busy {
                "Executing..."
            } else {
                "No results yet"
            };
            return vec![Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            ))];
        };

        let view = ResultView::from(result);
        let (icon, color) = if view.success {
            ("✓", Color::Green)
        } else {
            ("✗", Color::Red)
        };

        let mut lines = vec![Line::from(Span::styled(
            format!("{icon} {}", view.message),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))];

        if let Some(grid) = &view.grid {
            lines.push(Line::default());
            lines.extend(ResultTable::new(grid).render_to_lines(width));
        }

        lines
    }
}

impl Widget for ResultPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = match self.result {
            Some(r) if !r.success => Color::Red,
            _ if self.focused => Color::Cyan,
            _ => Color::DarkGray,
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Result ");

        let width = area.width.saturating_sub(2) as usize;
        let lines = self.lines(width);
        let max_scroll = lines.len().saturating_sub(1);
        let scroll = self.scroll.min(max_scroll) as u16;

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(area, buf);
    }
}
