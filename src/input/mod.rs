//! Keyboard input mapping
//!
//! Collapses the key handling into a fixed binding set: the editor takes
//! plain characters, Tab moves focus, arrows drive the selectors and reply
//! tabs, Ctrl-S submits. The inbox popup is modal and captures all keys
//! while open.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::state::{AppState, Focus};

/// High-level actions produced from key events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    FocusNext,
    FocusPrev,
    /// Trigger analysis submission
    Submit,
    /// Open the inbox popup (ignored when the connector is unavailable)
    OpenInbox,
    InboxClose,
    InboxRefresh,
    InboxFetch,
    Up,
    Down,
    SelectorNext,
    SelectorPrev,
    SelectReply(usize),
    NextReply,
    PrevReply,
    /// Export the selected reply to a file
    ExportReply,
    CursorLeft,
    CursorRight,
    ClearEditor,
}

pub enum InputResult {
    Continue,
    Quit,
    Action(Action),
    Char(char),
    Backspace,
}

pub fn handle_input(event: Event, state: &AppState) -> InputResult {
    match event {
        Event::Key(key_event) => handle_key(key_event, state),
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, state: &AppState) -> InputResult {
    // Quit everywhere
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return InputResult::Quit;
    }

    // The inbox popup is modal
    if state.inbox.open {
        return handle_inbox_popup(key);
    }

    // Global bindings
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => return InputResult::Action(Action::Submit),
        (KeyModifiers::CONTROL, KeyCode::Char('o')) => {
            return InputResult::Action(Action::OpenInbox);
        }
        (KeyModifiers::CONTROL, KeyCode::Char('y')) => {
            return InputResult::Action(Action::ExportReply);
        }
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
            return InputResult::Action(Action::ClearEditor);
        }
        (_, KeyCode::Tab) => return InputResult::Action(Action::FocusNext),
        (_, KeyCode::BackTab) => return InputResult::Action(Action::FocusPrev),
        _ => {}
    }

    match state.focus {
        Focus::Editor => handle_editor_key(key),
        Focus::Tone | Focus::Formality | Focus::Length | Focus::Options => {
            handle_selector_key(key)
        }
        Focus::Replies => handle_replies_key(key),
    }
}

fn handle_inbox_popup(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Esc => InputResult::Action(Action::InboxClose),
        KeyCode::Up | KeyCode::Char('k') => InputResult::Action(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => InputResult::Action(Action::Down),
        KeyCode::Enter => InputResult::Action(Action::InboxFetch),
        KeyCode::Char('r') => InputResult::Action(Action::InboxRefresh),
        _ => InputResult::Continue,
    }
}

fn handle_editor_key(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Enter => InputResult::Char('\n'),
        KeyCode::Backspace => InputResult::Backspace,
        KeyCode::Left => InputResult::Action(Action::CursorLeft),
        KeyCode::Right => InputResult::Action(Action::CursorRight),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            InputResult::Char(c)
        }
        _ => InputResult::Continue,
    }
}

fn handle_selector_key(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => InputResult::Action(Action::SelectorPrev),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
            InputResult::Action(Action::SelectorNext)
        }
        KeyCode::Up | KeyCode::Char('k') => InputResult::Action(Action::FocusPrev),
        KeyCode::Down | KeyCode::Char('j') => InputResult::Action(Action::FocusNext),
        _ => InputResult::Continue,
    }
}

fn handle_replies_key(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Char(c @ '1'..='3') => {
            InputResult::Action(Action::SelectReply(c as usize - '1' as usize))
        }
        KeyCode::Left | KeyCode::Char('h') => InputResult::Action(Action::PrevReply),
        KeyCode::Right | KeyCode::Char('l') => InputResult::Action(Action::NextReply),
        _ => InputResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let mut state = AppState::new(true, false);
        assert!(matches!(handle_key(ctrl('c'), &state), InputResult::Quit));
        state.inbox.open = true;
        assert!(matches!(handle_key(ctrl('c'), &state), InputResult::Quit));
    }

    #[test]
    fn test_editor_receives_plain_chars() {
        let state = AppState::new(true, false);
        assert!(matches!(
            handle_key(key(KeyCode::Char('a')), &state),
            InputResult::Char('a')
        ));
        assert!(matches!(
            handle_key(key(KeyCode::Enter), &state),
            InputResult::Char('\n')
        ));
    }

    #[test]
    fn test_ctrl_s_submits_from_editor() {
        let state = AppState::new(true, false);
        assert!(matches!(
            handle_key(ctrl('s'), &state),
            InputResult::Action(Action::Submit)
        ));
    }

    #[test]
    fn test_selector_arrows_cycle_values() {
        let mut state = AppState::new(true, false);
        state.focus = Focus::Tone;
        assert!(matches!(
            handle_key(key(KeyCode::Right), &state),
            InputResult::Action(Action::SelectorNext)
        ));
        assert!(matches!(
            handle_key(key(KeyCode::Left), &state),
            InputResult::Action(Action::SelectorPrev)
        ));
    }

    #[test]
    fn test_popup_captures_keys() {
        let mut state = AppState::new(true, true);
        state.inbox.open = true;
        assert!(matches!(
            handle_key(key(KeyCode::Char('j')), &state),
            InputResult::Action(Action::Down)
        ));
        assert!(matches!(
            handle_key(key(KeyCode::Enter), &state),
            InputResult::Action(Action::InboxFetch)
        ));
        assert!(matches!(
            handle_key(key(KeyCode::Esc), &state),
            InputResult::Action(Action::InboxClose)
        ));
    }

    #[test]
    fn test_reply_tabs_by_number() {
        let mut state = AppState::new(true, false);
        state.focus = Focus::Replies;
        assert!(matches!(
            handle_key(key(KeyCode::Char('2')), &state),
            InputResult::Action(Action::SelectReply(1))
        ));
    }
}
