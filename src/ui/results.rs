//! Analysis results pane: classification, summary, action items, reply tabs

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};

use super::status_bar::spinner_char;
use super::theme::{Theme, borders};
use super::widgets::sanitize_text;
use crate::ai::AnalysisResult;
use crate::app::state::{AppState, Focus, Phase};

pub fn render_results_pane(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Focus::Replies;
    let border_style = if focused {
        Theme::border_focused()
    } else {
        Theme::border()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(borders::panel())
        .border_style(border_style)
        .title(" Analysis ");

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &state.phase {
        Phase::Idle => {
            let paragraph = Paragraph::new("Press Ctrl+S to analyze the email and draft replies.")
                .style(Theme::text_muted())
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, inner);
        }
        Phase::Submitting => {
            let line = Line::from(vec![
                Span::styled(format!("{} ", spinner_char()), Theme::text_warning()),
                Span::styled("Analyzing...", Theme::text_secondary()),
            ]);
            frame.render_widget(Paragraph::new(line), inner);
        }
        Phase::Failed(message) => {
            let lines = vec![
                Line::from(Span::styled("Analysis failed", Theme::text_warning())),
                Line::default(),
                Line::from(Span::styled(sanitize_text(message), Theme::text())),
                Line::default(),
                Line::from(Span::styled(
                    "Edit the email or preferences and press Ctrl+S to retry.",
                    Theme::text_muted(),
                )),
            ];
            let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
            frame.render_widget(paragraph, inner);
        }
        Phase::Succeeded(result) => render_result(frame, inner, state, result),
    }
}

fn render_result(frame: &mut Frame, area: Rect, state: &AppState, result: &AnalysisResult) {
    // Action items get as many rows as they need, capped to keep the
    // replies readable on small terminals
    let action_rows = (result.action_items.len() as u16).min(4);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),               // classification
            Constraint::Length(3),               // summary
            Constraint::Length(action_rows + 1), // action items
            Constraint::Min(4),                  // replies
        ])
        .split(area);

    render_classification(frame, chunks[0], result);
    render_summary(frame, chunks[1], result);
    render_action_items(frame, chunks[2], result);
    render_replies(frame, chunks[3], state, result);
}

fn render_classification(frame: &mut Frame, area: Rect, result: &AnalysisResult) {
    let line = Line::from(vec![
        Span::styled("Language ", Theme::label()),
        Span::styled(sanitize_text(&result.language), Theme::text()),
        Span::styled("  Urgency ", Theme::label()),
        Span::styled(sanitize_text(&result.urgency), urgency_style(&result.urgency)),
        Span::styled("  Sentiment ", Theme::label()),
        Span::styled(sanitize_text(&result.sentiment), Theme::text()),
        Span::styled("  Category ", Theme::label()),
        Span::styled(sanitize_text(&result.category), Theme::text()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn urgency_style(urgency: &str) -> ratatui::style::Style {
    match urgency.to_lowercase().as_str() {
        "high" | "critical" => Theme::text_warning(),
        "low" => Theme::text_success(),
        _ => Theme::text(),
    }
}

fn render_summary(frame: &mut Frame, area: Rect, result: &AnalysisResult) {
    let lines = vec![
        Line::from(Span::styled("Summary", Theme::label())),
        Line::from(Span::styled(
            sanitize_text(&result.summary),
            Theme::text_secondary(),
        )),
    ];
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_action_items(frame: &mut Frame, area: Rect, result: &AnalysisResult) {
    let mut lines = vec![Line::from(Span::styled("Action items", Theme::label()))];
    if result.action_items.is_empty() {
        lines.push(Line::from(Span::styled("(none)", Theme::text_muted())));
    } else {
        for item in &result.action_items {
            lines.push(Line::from(vec![
                Span::styled("• ", Theme::text_accent()),
                Span::styled(sanitize_text(item), Theme::text_secondary()),
            ]));
        }
    }
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_replies(frame: &mut Frame, area: Rect, state: &AppState, result: &AnalysisResult) {
    if result.replies.is_empty() {
        let paragraph = Paragraph::new("The model returned no reply drafts.")
            .style(Theme::text_muted())
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(2)])
        .split(area);

    let titles: Vec<String> = (1..=result.replies.len())
        .map(|i| format!("Reply {}", i))
        .collect();
    let selected = state.selected_reply.min(result.replies.len() - 1);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Theme::text_muted())
        .highlight_style(Theme::input_highlight());
    frame.render_widget(tabs, chunks[0]);

    let reply = &result.replies[selected];
    let mut lines = Vec::new();
    if !reply.subject.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Subject: ", Theme::label()),
            Span::styled(sanitize_text(&reply.subject), Theme::text()),
        ]));
        lines.push(Line::default());
    }
    for body_line in sanitize_text(&reply.body).lines() {
        lines.push(Line::from(Span::styled(
            body_line.to_string(),
            Theme::text(),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[1]);
}
