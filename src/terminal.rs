//! Scoped ownership of the terminal
//!
//! [`TerminalSession`] switches the terminal into raw mode and the alternate
//! screen when created and puts it back when dropped. A panic hook does the
//! same restore before the panic message is printed, so a crash inside the
//! menu never leaves the user's shell in raw mode.

use crate::error::{Result, SetupError};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{stdout, Stdout};
use std::sync::Once;
use tracing::debug;

static PANIC_HOOK: Once = Once::new();

/// Lends out a ratatui terminal for one menu session. Dropping the handle
/// ends the session.
pub trait TerminalHandle {
    type Backend: Backend;

    fn terminal(&mut self) -> &mut Terminal<Self::Backend>;
}

impl<B: Backend> TerminalHandle for Terminal<B> {
    type Backend = B;

    fn terminal(&mut self) -> &mut Terminal<B> {
        self
    }
}

/// Exclusive handle on the interactive terminal
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen
    pub fn enter() -> Result<Self> {
        install_panic_hook();

        enable_raw_mode()
            .map_err(|e| SetupError::terminal(format!("Failed to enable raw mode: {}", e)))?;

        if let Err(e) = execute!(stdout(), EnterAlternateScreen, Hide) {
            restore();
            return Err(SetupError::terminal(format!(
                "Failed to enter alternate screen: {}",
                e
            )));
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout())) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore();
                return Err(SetupError::terminal(format!("Failed to create terminal: {}", e)));
            }
        };

        debug!("Terminal session started");
        Ok(Self { terminal })
    }
}

impl TerminalHandle for TerminalSession {
    type Backend = CrosstermBackend<Stdout>;

    fn terminal(&mut self) -> &mut Terminal<Self::Backend> {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore();
        debug!("Terminal session restored");
    }
}

/// Leave the alternate screen and raw mode. Safe to call more than once.
pub fn restore() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, Show);
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore();
            previous(info);
        }));
    });
}
