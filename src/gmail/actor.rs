//! Async actor for inbox listing and body fetching
//!
//! Mirrors the AI actor: the UI sends commands and polls events, one inbox
//! operation in flight at a time. Errors are carried as plain strings and
//! shown inline in the inbox popup.

use tokio::sync::mpsc;

use super::client::{GmailClient, MessageSummary};

/// Commands accepted by the Gmail actor
#[derive(Debug)]
pub enum GmailCommand {
    /// Refresh the inbox listing
    ListRecent,
    /// Fetch one message body
    FetchBody { id: String },
    /// Shutdown the actor
    Shutdown,
}

/// Events emitted by the Gmail actor
#[derive(Debug)]
pub enum GmailEvent {
    /// Fresh inbox listing
    Listing(Vec<MessageSummary>),
    /// Decoded body of the requested message
    Body { id: String, text: String },
    /// An inbox operation failed
    Error(String),
}

/// Handle for communicating with the Gmail actor
pub struct GmailActorHandle {
    pub cmd_tx: mpsc::Sender<GmailCommand>,
    pub event_rx: mpsc::Receiver<GmailEvent>,
}

/// Spawn the Gmail actor task
pub fn spawn_gmail_actor(client: GmailClient, max_results: u32) -> GmailActorHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(32);

    tokio::spawn(gmail_actor_loop(client, max_results, cmd_rx, event_tx));

    GmailActorHandle { cmd_tx, event_rx }
}

async fn gmail_actor_loop(
    client: GmailClient,
    max_results: u32,
    mut cmd_rx: mpsc::Receiver<GmailCommand>,
    event_tx: mpsc::Sender<GmailEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let event = match cmd {
            GmailCommand::ListRecent => match client.list_recent(max_results).await {
                Ok(listing) => GmailEvent::Listing(listing),
                Err(e) => GmailEvent::Error(format!("Inbox listing failed: {:#}", e)),
            },

            GmailCommand::FetchBody { id } => match client.fetch_body(&id).await {
                Ok(text) => GmailEvent::Body { id, text },
                Err(e) => GmailEvent::Error(format!("Fetch failed: {:#}", e)),
            },

            GmailCommand::Shutdown => break,
        };

        if event_tx.send(event).await.is_err() {
            tracing::warn!("Gmail actor: event receiver dropped");
            break;
        }
    }
}
