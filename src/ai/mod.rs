//! Analysis-and-reply protocol against a hosted completion provider
//!
//! The contract with the model has three parts:
//! - prompt construction (`prompts`): a fixed system instruction plus a
//!   deterministic user instruction embedding the email and preferences
//! - the completion call itself (`client`)
//! - defensive parsing of the response into an `AnalysisResult` (`parser`)

mod actor;
mod client;
mod error;
mod parser;
mod prompts;
mod types;

pub use actor::{AiActorHandle, AiCommand, AiEvent, spawn_ai_actor};
pub use client::OpenAiClient;
pub use types::{AnalysisResult, ReplyOption, ReplyPreferences};
