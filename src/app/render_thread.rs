//! Background render thread
//!
//! The render thread owns the terminal for its whole lifetime, including
//! raw-mode setup and teardown, and draws state snapshots sent from the
//! event loop. The channel has capacity 1: a frame that arrives while the
//! previous one is still drawing simply replaces it.

use std::io;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use super::state::AppState;

enum RenderCommand {
    Frame(Box<AppState>),
    Shutdown,
}

/// Handle to the background render thread.
pub struct RenderThread {
    cmd_tx: SyncSender<RenderCommand>,
    handle: Option<JoinHandle<()>>,
}

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(e).context("Failed to enter alternate screen");
    }
    match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            disable_raw_mode().ok();
            Err(e).context("Failed to create terminal")
        }
    }
}

fn restore_terminal(terminal: &mut Tui) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
}

fn render_loop(cmd_rx: mpsc::Receiver<RenderCommand>) {
    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(e) => {
            tracing::error!("terminal setup failed: {:#}", e);
            return;
        }
    };

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            RenderCommand::Frame(state) => {
                if let Err(e) = terminal.draw(|f| crate::ui::render(f, &state)) {
                    tracing::error!("render error: {}", e);
                }
            }
            RenderCommand::Shutdown => break,
        }
    }

    restore_terminal(&mut terminal);
}

impl RenderThread {
    /// Spawn the render thread; it performs terminal setup itself.
    pub fn spawn() -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::sync_channel::<RenderCommand>(1);
        let handle = thread::spawn(move || render_loop(cmd_rx));

        Ok(Self {
            cmd_tx,
            handle: Some(handle),
        })
    }

    /// Submit a state snapshot for rendering without blocking the event loop.
    pub fn render(&self, state: AppState) {
        match self.cmd_tx.try_send(RenderCommand::Frame(Box::new(state))) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                // The pending frame is stale anyway; drop this one too and
                // let the next dirty tick deliver the latest state
                tracing::trace!("render thread busy, frame skipped");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("render thread disconnected");
            }
        }
    }

    /// Shutdown the render thread and wait for terminal restoration.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(RenderCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}
