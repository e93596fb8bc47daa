mod editor;
mod inbox;
mod results;
mod status_bar;
pub mod theme;
mod widgets;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::state::{AppState, Focus};
use crate::constants::MIN_SPLIT_VIEW_WIDTH;

pub fn render(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // main area
            Constraint::Length(1), // help bar
        ])
        .split(frame.area());

    let main_area = chunks[1];

    if main_area.width >= MIN_SPLIT_VIEW_WIDTH {
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(main_area);
        editor::render_editor_pane(frame, panes[0], state);
        results::render_results_pane(frame, panes[1], state);
    } else if state.focus == Focus::Replies {
        // Narrow terminal: only the focused pane fits
        results::render_results_pane(frame, main_area, state);
    } else {
        editor::render_editor_pane(frame, main_area, state);
    }

    if let Some(ref error) = state.status.error {
        widgets::error_bar(frame, chunks[0], error);
    } else {
        status_bar::render_status_bar(frame, chunks[0], state);
    }
    status_bar::render_help_bar(frame, chunks[2], state);

    if state.inbox.open {
        inbox::render_inbox_popup(frame, state);
    }
}
