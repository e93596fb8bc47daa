//! Status and help bars at the bottom of the screen

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme::Theme;
use crate::app::state::{AppState, Focus};
use crate::constants::SPINNER_FRAME_MS;

pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let style = Theme::status_bar();

    let mut spans: Vec<Span> = Vec::new();

    if state.phase.is_submitting() || state.inbox.busy() {
        spans.push(Span::styled(
            format!(" {} ", spinner_char()),
            Theme::status_syncing(),
        ));
    } else {
        spans.push(Span::styled("   ", style));
    }

    if !state.api_key_configured {
        // Persistent banner; the key is never shown, only its absence
        spans.push(Span::styled(
            "No API key (set OPENAI_API_KEY) ",
            Theme::status_syncing(),
        ));
        spans.push(Span::styled("│ ", style));
    }

    if !state.status.message.is_empty() {
        spans.push(Span::styled(state.status.message.clone(), style));
    }

    let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();

    let right = format!(
        " {} chars │ {} ",
        state.email_input.chars().count(),
        phase_label(state)
    );
    let padding_width = (area.width as usize).saturating_sub(left_width + right.chars().count());
    spans.push(Span::styled(" ".repeat(padding_width), style));
    spans.push(Span::styled(right, style));

    let paragraph = Paragraph::new(Line::from(spans)).style(style);
    frame.render_widget(paragraph, area);
}

pub fn render_help_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut hints: Vec<(&str, &str)> = Vec::new();

    if state.inbox.open {
        hints.extend([
            ("↑/↓", "select"),
            ("Enter", "load"),
            ("r", "refresh"),
            ("Esc", "close"),
            ("Ctrl+C", "quit"),
        ]);
    } else {
        hints.push(("Ctrl+S", "generate"));
        if state.inbox_available {
            hints.push(("Ctrl+O", "inbox"));
        }
        if state.focus == Focus::Replies {
            hints.extend([("1-3", "reply"), ("Ctrl+Y", "save reply")]);
        } else if state.focus.is_selector() {
            hints.push(("←/→", "change"));
        }
        hints.extend([("Tab", "focus"), ("Ctrl+U", "clear"), ("Ctrl+C", "quit")]);
    }

    super::widgets::help_bar(frame, area, &hints);
}

fn phase_label(state: &AppState) -> &'static str {
    use crate::app::state::Phase;
    match state.phase {
        Phase::Idle => "idle",
        Phase::Submitting => "analyzing",
        Phase::Succeeded(_) => "done",
        Phase::Failed(_) => "failed",
    }
}

/// Get an animated spinner character for loading states
pub fn spinner_char() -> char {
    let spinner = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
    let idx = (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        / SPINNER_FRAME_MS) as usize
        % spinner.chars().count();

    spinner.chars().nth(idx).unwrap_or('*')
}
