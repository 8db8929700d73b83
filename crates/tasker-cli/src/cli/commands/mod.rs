//! CLI command handlers.
//!
//! One-shot commands drive the same runtime as the shell: restore the session,
//! deliver one gesture, then print the resulting notice.

pub mod auth;
pub mod config;
pub mod shell;
pub mod tasks;

use std::io::{self, BufRead, Write};

use anyhow::{Result, bail};
use tasker_ui::render::render_notice;
use tasker_ui::{AppState, Prompter, Runtime, Services};

/// Asks on the terminal; anything but `y`/`yes` declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompter {
    assume_yes: bool,
}

impl StdinPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompter for StdinPrompter {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{prompt} [y/N] ");
        let _ = io::stdout().flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Restores the persisted session; fails unless it is usable.
pub async fn signed_in(
    services: Services,
    prompter: StdinPrompter,
) -> Result<Runtime<StdinPrompter>> {
    let mut runtime = Runtime::new(services, prompter);
    runtime.start().await;

    let state = runtime.state();
    if !state.is_signed_in() {
        if let Some(notice) = &state.notice {
            bail!("{}", notice.text);
        }
        bail!("Not logged in. Run `tasker login` first.");
    }
    if let Some(notice) = state.notice.as_ref().filter(|n| n.is_error()) {
        bail!("{}", notice.text);
    }
    Ok(runtime)
}

/// Prints the notice left by the last gesture. An error notice fails the
/// command with its text.
pub fn report(state: &AppState) -> Result<()> {
    match &state.notice {
        Some(notice) if notice.is_error() => bail!("{}", notice.text),
        Some(notice) => println!("{}", render_notice(notice)),
        None => {}
    }
    Ok(())
}
