//! Application state types
//!
//! All state types live here to maintain clean dependency:
//! UI layer imports from app layer, not vice versa.

use std::time::Instant;

use crate::ai::{AnalysisResult, ReplyPreferences};
use crate::constants::ERROR_TTL_SECS;
use crate::gmail::MessageSummary;

/// Lifecycle of one analysis attempt.
///
/// `Idle` is entered at start and re-entered whenever the user edits the
/// email text or preferences in a terminal phase. `Submitting` is the only
/// phase with a completion call in flight; further submissions are ignored
/// until it resolves. There is no cancellation and no automatic retry.
#[derive(Debug, Clone, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Succeeded(AnalysisResult),
    Failed(String),
}

impl Phase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }
}

/// Which widget receives keystrokes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Editor,
    Tone,
    Formality,
    Length,
    Options,
    Replies,
}

impl Focus {
    /// Cycle forward. The replies pane is only reachable when a result is
    /// on display.
    pub fn next(self, has_result: bool) -> Self {
        match self {
            Self::Editor => Self::Tone,
            Self::Tone => Self::Formality,
            Self::Formality => Self::Length,
            Self::Length => Self::Options,
            Self::Options if has_result => Self::Replies,
            Self::Options => Self::Editor,
            Self::Replies => Self::Editor,
        }
    }

    pub fn prev(self, has_result: bool) -> Self {
        match self {
            Self::Editor if has_result => Self::Replies,
            Self::Editor => Self::Options,
            Self::Tone => Self::Editor,
            Self::Formality => Self::Tone,
            Self::Length => Self::Formality,
            Self::Options => Self::Length,
            Self::Replies => Self::Options,
        }
    }

    pub fn is_selector(&self) -> bool {
        matches!(self, Self::Tone | Self::Formality | Self::Length | Self::Options)
    }
}

/// State of the inbox popup (only used when the connector is available)
#[derive(Debug, Clone, Default)]
pub struct InboxState {
    pub open: bool,
    pub loading: bool,
    /// Inline error shown in the popup, cleared on the next operation
    pub error: Option<String>,
    pub messages: Vec<MessageSummary>,
    pub selected: usize,
    /// Id of the message whose body is being fetched
    pub fetching: Option<String>,
}

impl InboxState {
    pub fn select_next(&mut self) {
        if !self.messages.is_empty() {
            self.selected = (self.selected + 1).min(self.messages.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_message(&self) -> Option<&MessageSummary> {
        self.messages.get(self.selected)
    }

    pub fn busy(&self) -> bool {
        self.loading || self.fetching.is_some()
    }
}

/// Loading, error, and status message state
#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub error: Option<String>,
    pub error_time: Option<Instant>,
    pub message: String,
}

/// Session-scoped application state. Nothing here survives a restart.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Email text being analyzed, edited in place
    pub email_input: String,
    /// Cursor position in the editor as a char offset
    pub cursor: usize,
    pub prefs: ReplyPreferences,
    pub phase: Phase,
    pub focus: Focus,
    /// Which reply tab is selected in the results pane
    pub selected_reply: usize,
    /// Whether the inbox connector prerequisite file exists
    pub inbox_available: bool,
    pub inbox: InboxState,
    /// Whether the provider API key was resolved at startup
    pub api_key_configured: bool,
    pub status: StatusState,
}

impl AppState {
    pub fn new(api_key_configured: bool, inbox_available: bool) -> Self {
        Self {
            email_input: String::new(),
            cursor: 0,
            prefs: ReplyPreferences::default(),
            phase: Phase::default(),
            focus: Focus::default(),
            selected_reply: 0,
            inbox_available,
            inbox: InboxState::default(),
            api_key_configured,
            status: StatusState::default(),
        }
    }

    /// Check the preconditions for leaving `Idle` for `Submitting`.
    ///
    /// Returns a user-visible validation message when submission must not
    /// proceed; `None` means a call may be issued. A missing API key is not
    /// reported here: the status bar shows a persistent banner for it and
    /// submission is gated before validation.
    pub fn validate_submission(&self) -> Option<String> {
        if self.phase.is_submitting() {
            return Some("Analysis already in progress".to_string());
        }
        if self.email_input.trim().is_empty() {
            return Some("Paste an email before generating a reply".to_string());
        }
        None
    }

    pub fn begin_submission(&mut self) {
        self.phase = Phase::Submitting;
        self.status.message = "Analyzing...".to_string();
    }

    pub fn complete_submission(&mut self, result: AnalysisResult) {
        self.selected_reply = 0;
        self.phase = Phase::Succeeded(result);
        self.status.message.clear();
    }

    pub fn fail_submission(&mut self, message: String) {
        self.phase = Phase::Failed(message.clone());
        self.status.message.clear();
        self.set_error(message);
    }

    /// Called on every edit of the email text or preferences: a terminal
    /// phase falls back to `Idle` and the previous result is discarded.
    pub fn touch(&mut self) {
        if self.phase.is_terminal() {
            self.phase = Phase::Idle;
            self.selected_reply = 0;
        }
    }

    pub fn has_result(&self) -> bool {
        self.phase.result().is_some()
    }

    // --- editor buffer operations ---

    pub fn insert_char(&mut self, c: char) {
        self.touch();
        let byte_idx = char_to_byte(&self.email_input, self.cursor);
        self.email_input.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.touch();
        self.cursor -= 1;
        let byte_idx = char_to_byte(&self.email_input, self.cursor);
        self.email_input.remove(byte_idx);
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.email_input.chars().count());
    }

    /// Replace the whole editor buffer (used by the inbox fetch path)
    pub fn set_email_input(&mut self, text: String) {
        self.touch();
        self.cursor = text.chars().count();
        self.email_input = text;
    }

    pub fn clear_email_input(&mut self) {
        self.touch();
        self.email_input.clear();
        self.cursor = 0;
    }

    // --- status/error handling ---

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status.message = message.into();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status.error = Some(message.into());
        self.status.error_time = Some(Instant::now());
    }

    /// Clear an expired error message. Returns true if one was cleared.
    pub fn clear_error_if_expired(&mut self) -> bool {
        if let Some(t) = self.status.error_time
            && t.elapsed().as_secs() >= ERROR_TTL_SECS
        {
            self.status.error = None;
            self.status.error_time = None;
            return true;
        }
        false
    }
}

fn char_to_byte(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AnalysisResult, ReplyOption};

    fn result_with_one_reply() -> AnalysisResult {
        AnalysisResult {
            language: "English".to_string(),
            urgency: "low".to_string(),
            sentiment: "neutral".to_string(),
            category: "test".to_string(),
            summary: "A test.".to_string(),
            action_items: vec![],
            replies: vec![ReplyOption {
                subject: "Re: test".to_string(),
                body: "ok".to_string(),
            }],
        }
    }

    #[test]
    fn test_empty_input_never_submits() {
        let state = AppState::new(true, false);
        assert!(state.validate_submission().is_some());

        let mut state = AppState::new(true, false);
        state.set_email_input("   \n\t  ".to_string());
        assert!(state.validate_submission().is_some());
        assert!(matches!(state.phase, Phase::Idle));
    }

    #[test]
    fn test_valid_input_submits_once() {
        let mut state = AppState::new(true, false);
        state.set_email_input("Hi, can you send the report by Friday? Thanks, Sam".to_string());
        assert!(state.validate_submission().is_none());

        state.begin_submission();
        assert!(state.phase.is_submitting());
        // Second submission while in flight is rejected
        assert!(state.validate_submission().is_some());
    }

    #[test]
    fn test_editing_after_success_returns_to_idle() {
        let mut state = AppState::new(true, false);
        state.set_email_input("original".to_string());
        state.begin_submission();
        state.complete_submission(result_with_one_reply());
        assert!(state.has_result());

        state.insert_char('!');
        assert!(matches!(state.phase, Phase::Idle));
        assert!(!state.has_result());
    }

    #[test]
    fn test_failure_is_terminal_until_edit() {
        let mut state = AppState::new(true, false);
        state.set_email_input("some email".to_string());
        state.begin_submission();
        state.fail_submission("provider request failed: 429".to_string());
        assert!(matches!(state.phase, Phase::Failed(_)));
        assert!(state.status.error.is_some());

        state.backspace();
        assert!(matches!(state.phase, Phase::Idle));
    }

    #[test]
    fn test_editor_cursor_handles_multibyte() {
        let mut state = AppState::new(true, false);
        for c in "grüße".chars() {
            state.insert_char(c);
        }
        assert_eq!(state.email_input, "grüße");
        state.backspace();
        state.backspace();
        assert_eq!(state.email_input, "grü");
        state.cursor_left();
        state.insert_char('x');
        assert_eq!(state.email_input, "grxü");
    }

    #[test]
    fn test_focus_cycle_skips_replies_without_result() {
        let mut focus = Focus::Editor;
        let mut seen = vec![focus];
        for _ in 0..4 {
            focus = focus.next(false);
            seen.push(focus);
        }
        assert_eq!(focus.next(false), Focus::Editor);
        assert!(!seen.contains(&Focus::Replies));

        assert_eq!(Focus::Options.next(true), Focus::Replies);
        assert_eq!(Focus::Replies.prev(true), Focus::Options);
    }

    #[test]
    fn test_inbox_selection_bounds() {
        let mut inbox = InboxState::default();
        inbox.select_next();
        assert_eq!(inbox.selected, 0);

        inbox.messages = vec![
            MessageSummary {
                id: "a".to_string(),
                from: "a@example.com".to_string(),
                subject: "A".to_string(),
                snippet: String::new(),
                date: 0,
            },
            MessageSummary {
                id: "b".to_string(),
                from: "b@example.com".to_string(),
                subject: "B".to_string(),
                snippet: String::new(),
                date: 0,
            },
        ];
        inbox.select_next();
        inbox.select_next();
        assert_eq!(inbox.selected, 1);
        inbox.select_prev();
        inbox.select_prev();
        assert_eq!(inbox.selected, 0);
    }
}
