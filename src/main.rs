mod ai;
mod app;
mod config;
mod constants;
mod gmail;
mod input;
mod ui;

use anyhow::Result;
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::Config;
use crate::gmail::{TokenStore, run_consent_flow};

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("debug,draftly=debug"));

    // Try to create a log file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .map(|dir| dir.join("draftly.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        // Log to file
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"draftly - AI email reply assistant for the terminal

Usage: draftly [command]

Commands:
    (none)      Start the assistant
    auth        Authorize read-only Gmail inbox access
    help        Show this help message

Configuration file: ~/.config/draftly/config.toml
The OpenAI API key is read from the OPENAI_API_KEY environment
variable, or from `api_key` in the [ai] section of the config file.
"#
    );
}

/// One-time Gmail consent flow. Opens the browser, waits for the redirect,
/// and stores the refresh token for later sessions.
async fn run_auth() -> Result<()> {
    let config = Config::load()?;
    config.ensure_dirs()?;

    let credentials_path = config.gmail.credentials_path();
    if !credentials_path.exists() {
        eprintln!(
            "No OAuth client credentials found at {}",
            credentials_path.display()
        );
        eprintln!(
            "Download an OAuth client ID (Desktop app) from the Google Cloud console\n\
             and save it to that path, then run 'draftly auth' again."
        );
        std::process::exit(1);
    }

    let tokens = run_consent_flow(&credentials_path).await?;

    match tokens.refresh_token {
        Some(ref refresh_token) => {
            TokenStore::new().save(refresh_token)?;
            println!("Authorization complete. Run 'draftly' to use the inbox.");
        }
        None => {
            // A stale stored token would otherwise mask the failed consent
            TokenStore::new().clear();
            eprintln!(
                "Google did not return a refresh token. Revoke access for this app\n\
                 at https://myaccount.google.com/permissions and run 'draftly auth' again."
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("auth") => run_auth().await,
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
        None => {
            setup_logging();

            let config = Config::load()?;
            config.ensure_dirs()?;

            // Initialize theme from config
            crate::ui::theme::init_theme(config.ui.theme);

            let mut app = App::new(config)?;
            app.run().await
        }
    }
}
