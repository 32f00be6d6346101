//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus};
use super::widgets::{
    analysis::AnalysisPanel, editor::Editor, header::Header, result::ResultPanel,
    sidebar::Sidebar, suggestions::SuggestionPopup, template_bar::TemplateBar, toast::Toast,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Height of the editor including its border.
const EDITOR_HEIGHT: u16 = 8;

const KEY_HINTS: &[(&str, &str)] = &[
    ("F5", "execute"),
    ("F6", "analyze"),
    ("Tab", "complete/focus"),
    ("Ctrl+L", "clear"),
    ("Ctrl+Q", "quit"),
];

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, templates, content, key hints
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(main_layout[2]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(EDITOR_HEIGHT), Constraint::Min(3)])
        .split(content_layout[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(content_layout[1]);

    render_header(frame, main_layout[0], app);
    frame.render_widget(TemplateBar, main_layout[1]);
    render_result(frame, left[1], app);
    render_sidebar(frame, right[0], right[1], app);
    render_key_hints(frame, main_layout[3]);

    // Drawn after the result panel so the suggestion popup covers it.
    render_editor(frame, left[0], app);

    if let Some(message) = app.toast() {
        frame.render_widget(Toast::new(message), Toast::area(area));
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let widget = Header::new(
        &app.service_info,
        app.console.registry().active(),
        app.spinner.as_ref(),
    );
    frame.render_widget(widget, area);
}

/// Renders the editor, its cursor and the suggestion popup.
fn render_editor(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Editor;
    let editor = Editor::new(app.console.buffer(), focused);
    let cursor = editor.cursor_position(area);
    frame.render_widget(editor, area);

    if !focused {
        return;
    }
    frame.set_cursor_position(cursor);

    let suggestions = app.console.suggestions();
    if suggestions.is_visible() {
        let popup = SuggestionPopup::popup_area(cursor, suggestions.items(), frame.area());
        frame.render_widget(SuggestionPopup::new(suggestions), popup);
    }
}

fn render_result(frame: &mut Frame, area: Rect, app: &App) {
    let widget = ResultPanel::new(
        app.console.execution(),
        app.console.is_busy(),
        app.focus == Focus::Results,
        app.result_scroll,
    );
    frame.render_widget(widget, area);
}

fn render_sidebar(frame: &mut Frame, analysis_area: Rect, databases_area: Rect, app: &App) {
    let focused = app.focus == Focus::Sidebar;
    frame.render_widget(
        AnalysisPanel::new(app.console.analysis(), focused, app.sidebar_scroll),
        analysis_area,
    );
    frame.render_widget(
        Sidebar::new(app.console.registry(), focused, 0),
        databases_area,
    );
}

fn render_key_hints(frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    for (key, action) in KEY_HINTS {
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        spans.push(Span::styled(
            format!(" {action} "),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
