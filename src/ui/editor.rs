//! Email editor pane and preference selectors

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::theme::{Theme, borders};
use crate::app::state::{AppState, Focus};

pub fn render_editor_pane(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // email text
            Constraint::Length(6), // preference selectors
        ])
        .split(area);

    render_email_input(frame, chunks[0], state);
    render_selectors(frame, chunks[1], state);
}

fn render_email_input(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Editor;
    let border_style = if focused {
        Theme::border_focused()
    } else {
        Theme::border()
    };

    let char_count = state.email_input.chars().count();
    let title = format!(" Email ({} chars) ", char_count);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(borders::panel())
        .border_style(border_style)
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let style = if focused {
        Theme::text()
    } else {
        Theme::text_secondary()
    };

    let text = if focused {
        with_cursor(&state.email_input, state.cursor)
    } else if state.email_input.is_empty() {
        return render_placeholder(frame, inner);
    } else {
        state.email_input.clone()
    };

    let paragraph = Paragraph::new(text).style(style).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}

fn render_placeholder(frame: &mut Frame, area: Rect) {
    let paragraph =
        Paragraph::new("Paste the email you received here, or press Ctrl+O to load one.")
            .style(Theme::text_muted())
            .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Insert a visible cursor marker at the given char offset
fn with_cursor(text: &str, cursor: usize) -> String {
    let byte_idx = text
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let mut out = text.to_string();
    out.insert(byte_idx, '│');
    out
}

fn render_selectors(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus.is_selector();
    let border_style = if focused {
        Theme::border_focused()
    } else {
        Theme::border()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(borders::panel())
        .border_style(border_style)
        .title(" Reply preferences ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let prefs = &state.prefs;
    let rows = [
        (Focus::Tone, "Tone", prefs.tone.as_str().to_string()),
        (
            Focus::Formality,
            "Formality",
            prefs.formality.as_str().to_string(),
        ),
        (Focus::Length, "Length", prefs.length.as_str().to_string()),
        (Focus::Options, "Options", prefs.option_count.to_string()),
    ];

    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(row_focus, label, value)| selector_line(row_focus == state.focus, label, value))
        .collect();

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

fn selector_line<'a>(focused: bool, label: &'a str, value: String) -> Line<'a> {
    let value_style = if focused {
        Theme::input_highlight()
    } else {
        Theme::text_secondary()
    };
    let marker = if focused { "‹ " } else { "  " };
    let end_marker = if focused { " ›" } else { "" };

    Line::from(vec![
        Span::styled(format!(" {:<10}", label), Theme::label()),
        Span::styled(marker, Theme::text_muted()),
        Span::styled(value, value_style),
        Span::styled(end_marker, Theme::text_muted()),
    ])
}
