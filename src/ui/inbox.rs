//! Inbox popup: pick a recent message to load into the editor

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use super::status_bar::spinner_char;
use super::theme::{Theme, borders};
use super::widgets::{centered_rect, format_date, sanitize_text, truncate_string};
use crate::app::state::AppState;
use crate::constants::SNIPPET_PREVIEW_LEN;

pub fn render_inbox_popup(frame: &mut Frame, state: &AppState) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);

    let title = if state.inbox.loading {
        format!(" Inbox {} ", spinner_char())
    } else {
        " Inbox ".to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(borders::popup())
        .border_style(Theme::border_focused())
        .title(title);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(ref error) = state.inbox.error {
        render_message(frame, inner, &sanitize_text(error), Theme::text_warning());
        return;
    }

    if state.inbox.loading && state.inbox.messages.is_empty() {
        render_message(frame, inner, "Loading messages...", Theme::text_muted());
        return;
    }

    if state.inbox.messages.is_empty() {
        render_message(
            frame,
            inner,
            "No messages. Press r to refresh.",
            Theme::text_muted(),
        );
        return;
    }

    render_message_list(frame, inner, state);
}

fn render_message(frame: &mut Frame, area: Rect, text: &str, style: ratatui::style::Style) {
    let paragraph = Paragraph::new(format!(" {}", text)).style(style);
    frame.render_widget(paragraph, area);
}

fn render_message_list(frame: &mut Frame, area: Rect, state: &AppState) {
    let width = area.width as usize;
    // Two rows per message: headers and snippet
    let visible = (area.height as usize / 2).max(1);

    // Keep the selection in view
    let offset = state
        .inbox
        .selected
        .saturating_sub(visible.saturating_sub(1));

    let mut lines: Vec<Line> = Vec::new();
    for (i, msg) in state
        .inbox
        .messages
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
    {
        let selected = i == state.inbox.selected;
        let fetching = state.inbox.fetching.as_deref() == Some(msg.id.as_str());

        let date = format_date(msg.date);
        let from_width = 28.min(width / 3);
        let subject_width = width.saturating_sub(from_width + date.len() + 5);

        let header_style = if selected { Theme::selected() } else { Theme::text() };
        let marker = if fetching {
            format!("{} ", spinner_char())
        } else if selected {
            "> ".to_string()
        } else {
            "  ".to_string()
        };

        lines.push(Line::from(vec![
            Span::styled(marker, header_style),
            Span::styled(
                format!(
                    "{:<from_width$}",
                    truncate_string(&sanitize_text(&msg.from), from_width)
                ),
                header_style,
            ),
            Span::styled(" ", header_style),
            Span::styled(
                format!(
                    "{:<subject_width$}",
                    truncate_string(&sanitize_text(&msg.subject), subject_width)
                ),
                header_style,
            ),
            Span::styled(format!(" {}", date), header_style),
        ]));

        let snippet = truncate_string(&sanitize_text(&msg.snippet), SNIPPET_PREVIEW_LEN);
        lines.push(Line::from(Span::styled(
            format!("    {}", snippet),
            Theme::text_muted(),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}
