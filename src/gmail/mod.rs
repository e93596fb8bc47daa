//! Optional read-only Gmail inbox connector
//!
//! Present only when a Google OAuth app-credential file is available; the
//! inbox UI is hidden entirely without it. Listing and body fetching go
//! through the Gmail REST API with a refresh-token-backed access token.
//! Failures here surface inline in the inbox popup and never affect the
//! analysis flow.

mod actor;
mod client;
mod oauth;
mod token_store;

pub use actor::{GmailActorHandle, GmailCommand, GmailEvent, spawn_gmail_actor};
pub use client::{GmailClient, MessageSummary};
pub use oauth::{AppCredentials, run_consent_flow};
pub use token_store::TokenStore;
