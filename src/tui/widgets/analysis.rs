//! Analysis sidebar: token list and syntax verdict.

use crate::console::{AnalysisResult, AnalysisView};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct AnalysisPanel<'a> {
    result: Option<&'a AnalysisResult>,
    focused: bool,
    scroll: usize,
}

impl<'a> AnalysisPanel<'a> {
    pub fn new(result: Option<&'a AnalysisResult>, focused: bool, scroll: usize) -> Self {
        Self {
            result,
            focused,
            scroll,
        }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let dim = Style::default().fg(Color::DarkGray);
        let heading = Style::default().add_modifier(Modifier::BOLD);

        let Some(result) = self.result else {
            return vec![Line::styled("Press F6 to analyze", dim)];
        };

        let view = AnalysisView::from(result);
        if let Some(message) = view.failure {
            return vec![
                Line::styled("Analysis failed", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Line::styled(message, Style::default().fg(Color::Red)),
            ];
        }

        let mut lines = Vec::new();

        if let Some((valid, verdict, message)) = view.syntax {
            let (icon, color) = if valid {
                ("✓", Color::Green)
            } else {
                ("✗", Color::Red)
            };
            lines.push(Line::styled(
                format!("{icon} {verdict}"),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
            if !message.is_empty() && message != verdict {
                lines.push(Line::raw(message));
            }
            if let Some(statement_type) = view.statement_type {
                lines.push(Line::from(vec![
                    Span::styled("Statement: ", dim),
                    Span::raw(statement_type),
                ]));
            }
            lines.push(Line::default());
        }

        if let Some(count) = view.token_count {
            lines.push(Line::styled(format!("Tokens ({count})"), heading));
            for token in view.tokens {
                lines.push(Line::from(vec![
                    Span::styled(format!("{:>4} ", token.position), dim),
                    Span::styled(
                        format!("{:<12} ", token.kind),
                        Style::default().fg(Color::Magenta),
                    ),
                    Span::raw(token.value),
                ]));
            }
        }

        lines
    }
}

impl Widget for AnalysisPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Analysis ");

        let lines = self.lines();
        let scroll = self.scroll.min(lines.len().saturating_sub(1)) as u16;

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(area, buf);
    }
}
