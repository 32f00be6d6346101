//! One-line bar listing the template shortcuts.

use crate::console::Template;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

pub struct TemplateBar;

impl TemplateBar {
    fn line() -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let label_style = Style::default().fg(Color::Gray);

        let mut spans = vec![Span::styled(" Templates ", label_style)];
        for (i, template) in Template::ALL.iter().enumerate() {
            spans.push(Span::styled(format!("Alt+{}", i + 1), key_style));
            spans.push(Span::styled(format!(" {}  ", template.label()), label_style));
        }
        Line::from(spans)
    }
}

impl Widget for TemplateBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_line(area.x, area.y, &Self::line(), area.width);
    }
}
