//! Async actor running analysis requests off the UI loop
//!
//! One command in flight at a time; the app enforces this by ignoring
//! submissions while in the Submitting phase. Failed attempts are not
//! retried, the user re-triggers submission explicitly.

use tokio::sync::mpsc;

use super::client::OpenAiClient;
use super::error::AiError;
use super::parser::parse_analysis;
use super::prompts::{ANALYSIS_SYSTEM, analysis_request};
use super::types::{AnalysisResult, ReplyPreferences};

/// Commands accepted by the AI actor
#[derive(Debug)]
pub enum AiCommand {
    /// Analyze an email and draft replies
    Analyze {
        email: String,
        prefs: ReplyPreferences,
    },
    /// Shutdown the actor
    Shutdown,
}

/// Events emitted by the AI actor
#[derive(Debug)]
pub enum AiEvent {
    /// Analysis parsed successfully
    AnalysisReady(AnalysisResult),
    /// The attempt failed (provider fault or malformed response)
    AnalysisFailed(AiError),
}

/// Handle for communicating with the AI actor
pub struct AiActorHandle {
    pub cmd_tx: mpsc::Sender<AiCommand>,
    pub event_rx: mpsc::Receiver<AiEvent>,
}

/// Spawn the AI actor task
pub fn spawn_ai_actor(client: OpenAiClient, temperature: f32, max_tokens: u32) -> AiActorHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(32);

    tokio::spawn(ai_actor_loop(
        client,
        temperature,
        max_tokens,
        cmd_rx,
        event_tx,
    ));

    AiActorHandle { cmd_tx, event_rx }
}

async fn ai_actor_loop(
    client: OpenAiClient,
    temperature: f32,
    max_tokens: u32,
    mut cmd_rx: mpsc::Receiver<AiCommand>,
    event_tx: mpsc::Sender<AiEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            AiCommand::Analyze { email, prefs } => {
                let user_instructions = analysis_request(&email, &prefs);
                let result = client
                    .complete(ANALYSIS_SYSTEM, &user_instructions, temperature, max_tokens)
                    .await
                    .and_then(|raw| parse_analysis(&raw));

                let event = match result {
                    Ok(analysis) => AiEvent::AnalysisReady(analysis),
                    Err(e) => AiEvent::AnalysisFailed(e),
                };
                if event_tx.send(event).await.is_err() {
                    tracing::warn!("AI actor: event receiver dropped");
                    break;
                }
            }

            AiCommand::Shutdown => {
                break;
            }
        }
    }
}
