//! Full-screen TUI for mailsweep.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;
pub mod view;

use std::io::{IsTerminal, stderr};

use anyhow::Result;
use mailsweep_core::config::Config;
use mailsweep_core::session::SessionStore;
pub use runtime::TuiRuntime;

/// Runs the interactive dashboard until the user quits.
pub async fn run(config: &Config, session: SessionStore) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!("mailsweep requires a terminal to render its interface.");
    }

    let mut runtime = TuiRuntime::new(config, session)?;
    runtime.run()?;

    Ok(())
}
