//! Result table widget for the TUI.
//!
//! Renders a result grid as a box-drawn table with column headers,
//! auto-sized columns, and styled NULL values.

use crate::console::{CellValue, ResultGrid};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Lays out a [`ResultGrid`] as table lines.
pub struct ResultTable<'a> {
    grid: &'a ResultGrid,
}

impl<'a> ResultTable<'a> {
    pub fn new(grid: &'a ResultGrid) -> Self {
        Self { grid }
    }

    /// Calculates the optimal width for each column.
    fn calculate_column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .grid
            .columns
            .iter()
            .map(|col| col.chars().count().max(MIN_COLUMN_WIDTH))
            .collect();

        for row in &self.grid.rows {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(value.to_display_string().chars().count());
            }
        }

        widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
    }

    /// Truncates a string to `max_width` characters, adding an ellipsis if needed.
    fn truncate(s: &str, max_width: usize) -> String {
        if s.chars().count() <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let head: String = s.chars().take(max_width - 3).collect();
            format!("{head}...")
        }
    }

    /// Renders the table to lines, shrinking columns to fit `available_width`.
    pub fn render_to_lines(&self, available_width: usize) -> Vec<Line<'static>> {
        if self.grid.columns.is_empty() {
            return vec![Line::from(Span::styled(
                "(empty result)",
                Style::default().fg(Color::DarkGray),
            ))];
        }

        let widths = self.calculate_column_widths();

        // Borders and padding take three cells per column plus one.
        let total_width: usize = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
        let scale_factor = if total_width > available_width && available_width > 0 {
            available_width as f64 / total_width as f64
        } else {
            1.0
        };

        let widths: Vec<usize> = widths
            .iter()
            .map(|&w| ((w as f64 * scale_factor) as usize).max(MIN_COLUMN_WIDTH))
            .collect();

        let mut lines = Vec::with_capacity(self.grid.rows.len() + 5);
        lines.push(Self::render_border(&widths, '┌', '┬', '┐'));
        lines.push(self.render_header_row(&widths));
        lines.push(Self::render_border(&widths, '├', '┼', '┤'));
        for row in &self.grid.rows {
            lines.push(Self::render_data_row(row, &widths));
        }
        lines.push(Self::render_border(&widths, '└', '┴', '┘'));

        let count = self.grid.rows.len();
        lines.push(Line::from(Span::styled(
            format!("{} row{}", count, if count == 1 { "" } else { "s" }),
            Style::default().fg(Color::DarkGray),
        )));

        lines
    }

    fn render_border(widths: &[usize], left: char, mid: char, right: char) -> Line<'static> {
        let mut border = String::new();
        border.push(left);

        for (i, &width) in widths.iter().enumerate() {
            border.push_str(&"─".repeat(width + 2));
            if i < widths.len() - 1 {
                border.push(mid);
            }
        }

        border.push(right);

        Line::from(Span::styled(border, Style::default().fg(Color::DarkGray)))
    }

    fn render_header_row(&self, widths: &[usize]) -> Line<'static> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (col, &width) in self.grid.columns.iter().zip(widths) {
            let name = Self::truncate(col, width);
            spans.push(Span::styled(
                format!(" {name:width$} "),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    fn render_data_row(row: &[CellValue], widths: &[usize]) -> Line<'static> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (value, &width) in row.iter().zip(widths) {
            let display = Self::truncate(&value.to_display_string(), width);
            let style = if value.is_null() {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };

            spans.push(Span::styled(format!(" {display:width$} "), style));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }
}
