//! Action handling: submission, selectors, reply tabs, inbox operations

use anyhow::Result;
use std::fs;

use crate::ai::AiCommand;
use crate::config::Config;
use crate::gmail::GmailCommand;
use crate::input::Action;

use super::App;
use super::state::Focus;

impl App {
    pub(crate) async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::FocusNext => {
                self.state.focus = self.state.focus.next(self.state.has_result());
            }
            Action::FocusPrev => {
                self.state.focus = self.state.focus.prev(self.state.has_result());
            }

            Action::Submit => self.submit().await,

            Action::OpenInbox => self.open_inbox().await,
            Action::InboxClose => {
                self.state.inbox.open = false;
            }
            Action::InboxRefresh => self.refresh_inbox().await,
            Action::InboxFetch => self.fetch_selected_message().await,
            Action::Up => self.state.inbox.select_prev(),
            Action::Down => self.state.inbox.select_next(),

            Action::SelectorNext => self.cycle_selector(true),
            Action::SelectorPrev => self.cycle_selector(false),

            Action::SelectReply(idx) => self.select_reply(idx),
            Action::NextReply => {
                let idx = self.state.selected_reply + 1;
                self.select_reply(idx);
            }
            Action::PrevReply => {
                let idx = self.state.selected_reply.saturating_sub(1);
                self.select_reply(idx);
            }
            Action::ExportReply => self.export_selected_reply(),

            Action::CursorLeft => self.state.cursor_left(),
            Action::CursorRight => self.state.cursor_right(),
            Action::ClearEditor => {
                if !self.state.phase.is_submitting() {
                    self.state.clear_email_input();
                }
            }
        }

        Ok(())
    }

    // Buffer and preference edits are frozen while a call is in flight so
    // the in-flight request always matches what is on screen.

    pub(crate) fn handle_char(&mut self, c: char) {
        if self.state.focus == Focus::Editor && !self.state.phase.is_submitting() {
            self.state.insert_char(c);
        }
    }

    pub(crate) fn handle_backspace(&mut self) {
        if self.state.focus == Focus::Editor && !self.state.phase.is_submitting() {
            self.state.backspace();
        }
    }

    /// Validate preconditions and hand the analysis request to the AI actor
    async fn submit(&mut self) {
        // A missing key is already reported by the persistent status-bar
        // banner; a transient error on every attempt would just repeat it
        if !self.state.api_key_configured {
            return;
        }
        if let Some(message) = self.state.validate_submission() {
            self.state.set_error(message);
            return;
        }

        let Some(ref actor) = self.ai_actor else {
            return;
        };

        self.state.begin_submission();
        let cmd = AiCommand::Analyze {
            email: self.state.email_input.clone(),
            prefs: self.state.prefs,
        };
        if actor.cmd_tx.send(cmd).await.is_err() {
            self.state
                .fail_submission("Analysis service is not running".to_string());
        }
    }

    async fn open_inbox(&mut self) {
        // Hidden entirely when the connector prerequisite is absent
        if self.gmail_actor.is_none() {
            return;
        }
        self.state.inbox.open = true;
        if self.state.inbox.messages.is_empty() && !self.state.inbox.loading {
            self.refresh_inbox().await;
        }
    }

    async fn refresh_inbox(&mut self) {
        let Some(ref actor) = self.gmail_actor else {
            return;
        };
        self.state.inbox.loading = true;
        self.state.inbox.error = None;
        if actor.cmd_tx.send(GmailCommand::ListRecent).await.is_err() {
            self.state.inbox.loading = false;
            self.state.inbox.error = Some("Inbox service is not running".to_string());
        }
    }

    async fn fetch_selected_message(&mut self) {
        let Some(ref actor) = self.gmail_actor else {
            return;
        };
        if self.state.inbox.busy() {
            return;
        }
        let Some(message) = self.state.inbox.selected_message() else {
            return;
        };
        let id = message.id.clone();
        self.state.inbox.fetching = Some(id.clone());
        self.state.inbox.error = None;
        if actor
            .cmd_tx
            .send(GmailCommand::FetchBody { id })
            .await
            .is_err()
        {
            self.state.inbox.fetching = None;
            self.state.inbox.error = Some("Inbox service is not running".to_string());
        }
    }

    /// Cycle the value of the focused preference selector. Any change
    /// discards a displayed result (back to Idle).
    fn cycle_selector(&mut self, forward: bool) {
        if self.state.phase.is_submitting() {
            return;
        }
        let prefs = &mut self.state.prefs;
        match self.state.focus {
            Focus::Tone => {
                prefs.tone = if forward {
                    prefs.tone.next()
                } else {
                    prefs.tone.prev()
                };
            }
            Focus::Formality => {
                prefs.formality = if forward {
                    prefs.formality.next()
                } else {
                    prefs.formality.prev()
                };
            }
            Focus::Length => {
                prefs.length = if forward {
                    prefs.length.next()
                } else {
                    prefs.length.prev()
                };
            }
            Focus::Options => {
                if forward {
                    prefs.more_options();
                } else {
                    prefs.fewer_options();
                }
            }
            _ => return,
        }
        self.state.touch();
    }

    fn select_reply(&mut self, idx: usize) {
        let Some(result) = self.state.phase.result() else {
            return;
        };
        if result.replies.is_empty() {
            return;
        }
        self.state.selected_reply = idx.min(result.replies.len() - 1);
    }

    /// Write the selected reply as a combined subject+body block to a file
    /// in the data directory and report the path.
    fn export_selected_reply(&mut self) {
        let Some(result) = self.state.phase.result() else {
            return;
        };
        let Some(reply) = result.replies.get(self.state.selected_reply) else {
            return;
        };

        let content = format!("Subject: {}\n\n{}\n", reply.subject, reply.body);
        let path = match Config::data_dir() {
            Ok(dir) => dir.join(format!("reply-{}.txt", self.state.selected_reply + 1)),
            Err(e) => {
                self.state.set_error(format!("Export failed: {}", e));
                return;
            }
        };

        match fs::write(&path, content) {
            Ok(()) => self.state.set_status(format!("Saved to {}", path.display())),
            Err(e) => self.state.set_error(format!("Export failed: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{AppState, Phase};

    fn app_without_actors() -> App {
        App {
            state: AppState::new(true, false),
            ai_actor: None,
            gmail_actor: None,
            dirty: true,
        }
    }

    #[test]
    fn test_editor_frozen_while_submitting() {
        let mut app = app_without_actors();
        app.state.set_email_input("original".to_string());
        app.state.begin_submission();

        app.handle_char('x');
        app.handle_backspace();

        assert_eq!(app.state.email_input, "original");
        assert!(app.state.phase.is_submitting());
    }

    #[test]
    fn test_selectors_frozen_while_submitting() {
        let mut app = app_without_actors();
        app.state.focus = Focus::Tone;
        app.state.set_email_input("hello".to_string());
        app.state.begin_submission();

        let before = app.state.prefs;
        app.cycle_selector(true);
        app.cycle_selector(false);

        assert_eq!(app.state.prefs, before);
        assert!(app.state.phase.is_submitting());
    }

    #[tokio::test]
    async fn test_clear_editor_ignored_while_submitting() {
        let mut app = app_without_actors();
        app.state.set_email_input("keep me".to_string());
        app.state.begin_submission();

        app.handle_action(Action::ClearEditor).await.unwrap();
        assert_eq!(app.state.email_input, "keep me");
    }

    #[tokio::test]
    async fn test_missing_key_submit_is_silent() {
        let mut app = app_without_actors();
        app.state.api_key_configured = false;
        app.state.set_email_input("Hello there".to_string());

        app.handle_action(Action::Submit).await.unwrap();

        // Blocked without a transient error: the status-bar banner is the
        // only surface for a missing key
        assert!(matches!(app.state.phase, Phase::Idle));
        assert!(app.state.status.error.is_none());
    }

    #[tokio::test]
    async fn test_empty_input_submit_reports_transient_error() {
        let mut app = app_without_actors();
        app.handle_action(Action::Submit).await.unwrap();
        assert!(matches!(app.state.phase, Phase::Idle));
        assert!(app.state.status.error.is_some());
    }
}
