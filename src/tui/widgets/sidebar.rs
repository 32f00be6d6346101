//! Sidebar widget listing databases and the active database's tables.

use crate::console::DatabaseRegistry;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct Sidebar<'a> {
    registry: &'a DatabaseRegistry,
    focused: bool,
    scroll: usize,
}

impl<'a> Sidebar<'a> {
    pub fn new(registry: &'a DatabaseRegistry, focused: bool, scroll: usize) -> Self {
        Self {
            registry,
            focused,
            scroll,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let dim = Style::default().fg(Color::DarkGray);

        if self.registry.known().is_empty() {
            return vec![Line::styled("No databases", dim)];
        }

        let mut lines = Vec::new();
        for name in self.registry.known() {
            if self.registry.is_active(name) {
                lines.push(Line::from(Span::styled(
                    format!("▶ {name}"),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                )));
                for table in self.registry.tables() {
                    lines.push(Line::styled(format!("    {table}"), dim));
                }
            } else {
                lines.push(Line::raw(format!("  {name}")));
            }
        }
        lines
    }
}

impl Widget for Sidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Databases ");

        let lines = self.lines();
        let scroll = self.scroll.min(lines.len().saturating_sub(1)) as u16;

        Paragraph::new(lines)
            .block(block)
            .scroll((scroll, 0))
            .render(area, buf);
    }
}
