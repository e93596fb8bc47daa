//! Main event loop and actor event processing

use anyhow::Result;
use crossterm::event;
use std::time::Duration;

use crate::ai::AiEvent;
use crate::constants::{POLL_BUSY_MS, POLL_IDLE_MS};
use crate::gmail::GmailEvent;
use crate::input::{InputResult, handle_input};

use super::App;
use super::render_thread::RenderThread;
use super::state::Focus;

impl App {
    pub(crate) async fn event_loop(&mut self, render_thread: &RenderThread) -> Result<()> {
        loop {
            // Process actor events first (non-blocking)
            if self.process_ai_events() {
                self.dirty = true;
            }
            if self.process_gmail_events() {
                self.dirty = true;
            }

            // Clear expired errors
            if self.state.clear_error_if_expired() {
                self.dirty = true;
            }

            // Render only when dirty (non-blocking - sends to render thread)
            if self.dirty {
                render_thread.render(self.state.clone());
                self.dirty = false;
            }

            // Handle input (faster polling while a call is in flight, for
            // the spinner and prompt result delivery)
            let busy = self.state.phase.is_submitting() || self.state.inbox.busy();
            let poll_timeout = if busy { POLL_BUSY_MS } else { POLL_IDLE_MS };
            if event::poll(Duration::from_millis(poll_timeout))? {
                let evt = event::read()?;
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.state) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => {
                        self.handle_action(action).await?;
                    }
                    InputResult::Char(c) => {
                        self.handle_char(c);
                    }
                    InputResult::Backspace => {
                        self.handle_backspace();
                    }
                    InputResult::Continue => {}
                }
            } else if busy {
                // Keep the spinner moving while waiting
                self.dirty = true;
            }
        }

        Ok(())
    }

    /// Process events from the AI actor. Returns true if any were processed.
    fn process_ai_events(&mut self) -> bool {
        let Some(ref mut actor) = self.ai_actor else {
            return false;
        };

        let mut had_events = false;
        while let Ok(event) = actor.event_rx.try_recv() {
            had_events = true;
            match event {
                AiEvent::AnalysisReady(result) => {
                    tracing::info!(
                        replies = result.replies.len(),
                        requested = self.state.prefs.option_count,
                        "analysis complete"
                    );
                    if result.replies.is_empty() {
                        self.state.set_status("Model returned no reply drafts");
                    } else {
                        self.state.focus = Focus::Replies;
                    }
                    self.state.complete_submission(result);
                }
                AiEvent::AnalysisFailed(e) => {
                    tracing::warn!("analysis failed: {}", e);
                    self.state.fail_submission(e.to_string());
                }
            }
        }
        had_events
    }

    /// Process events from the Gmail actor. Returns true if any were processed.
    fn process_gmail_events(&mut self) -> bool {
        let Some(ref mut actor) = self.gmail_actor else {
            return false;
        };

        let mut had_events = false;
        while let Ok(event) = actor.event_rx.try_recv() {
            had_events = true;
            match event {
                GmailEvent::Listing(messages) => {
                    self.state.inbox.loading = false;
                    self.state.inbox.error = None;
                    self.state.inbox.selected = 0;
                    self.state.inbox.messages = messages;
                }
                GmailEvent::Body { id, text } => {
                    tracing::debug!("fetched body for message {}", id);
                    self.state.inbox.fetching = None;
                    self.state.inbox.open = false;
                    self.state.set_email_input(text);
                    self.state.focus = Focus::Editor;
                    self.state.set_status("Message loaded into editor");
                }
                GmailEvent::Error(message) => {
                    // Inline in the popup only; the analysis flow is unaffected
                    self.state.inbox.loading = false;
                    self.state.inbox.fetching = None;
                    self.state.inbox.error = Some(message);
                }
            }
        }
        had_events
    }
}
