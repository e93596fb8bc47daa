//! Application core - manages state, actors, and coordination

mod actions;
mod event_loop;
pub mod render_thread;
pub mod state;

use anyhow::Result;

use render_thread::RenderThread;

use crate::ai::{AiActorHandle, AiCommand, OpenAiClient, spawn_ai_actor};
use crate::config::Config;
use crate::gmail::{
    AppCredentials, GmailActorHandle, GmailClient, GmailCommand, TokenStore, spawn_gmail_actor,
};
use state::AppState;

pub struct App {
    pub(crate) state: AppState,
    /// None when no API key is configured; submission stays disabled
    pub(crate) ai_actor: Option<AiActorHandle>,
    /// None when the inbox connector prerequisite file is absent
    pub(crate) gmail_actor: Option<GmailActorHandle>,
    /// Dirty flag: when true, UI needs re-render. Skips renders when nothing changed.
    pub(crate) dirty: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config.ai.resolve_api_key();

        let ai_actor = api_key.map(|key| {
            let client = OpenAiClient::new(key, config.ai.model.clone());
            spawn_ai_actor(client, config.ai.temperature, config.ai.max_tokens)
        });
        if ai_actor.is_none() {
            tracing::warn!("no API key configured, submission disabled");
        }

        let gmail_actor = if config.gmail.is_available() {
            match Self::spawn_inbox(&config) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!("inbox connector disabled: {:#}", e);
                    None
                }
            }
        } else {
            None
        };

        let state = AppState::new(ai_actor.is_some(), gmail_actor.is_some());

        Ok(Self {
            state,
            ai_actor,
            gmail_actor,
            dirty: true, // Start dirty for initial render
        })
    }

    fn spawn_inbox(config: &Config) -> Result<GmailActorHandle> {
        let credentials = AppCredentials::load(&config.gmail.credentials_path())?;
        let tokens = TokenStore::new();
        if !tokens.has_token() {
            tracing::warn!("no Gmail refresh token stored; run 'draftly auth' to authorize");
        }
        let client = GmailClient::new(credentials, tokens)?;
        Ok(spawn_gmail_actor(client, config.gmail.max_results))
    }

    pub async fn run(&mut self) -> Result<()> {
        // Spawn background render thread (owns terminal setup/teardown)
        let render_thread = RenderThread::spawn()?;

        let result = self.event_loop(&render_thread).await;

        // Shutdown render thread (handles terminal cleanup)
        render_thread.shutdown();

        // Shutdown actors
        if let Some(ref ai) = self.ai_actor {
            ai.cmd_tx.send(AiCommand::Shutdown).await.ok();
        }
        if let Some(ref gmail) = self.gmail_actor {
            gmail.cmd_tx.send(GmailCommand::Shutdown).await.ok();
        }

        result
    }
}
