//! CLI entry for mailsweep.

use anyhow::{Context, Result};
use clap::Parser;
use mailsweep_core::config::{Config, paths};
use mailsweep_core::logging;
use mailsweep_core::session::SessionStore;

#[derive(Parser)]
#[command(name = "mailsweep")]
#[command(version)]
#[command(about = "Terminal dashboard for finding and dropping email subscriptions")]
struct Cli {
    /// Override the gateway base URL from config
    #[arg(long, env = "MAILSWEEP_BASE_URL", value_name = "URL")]
    base_url: Option<String>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let _log_guard = logging::init(&paths::log_dir()).context("Failed to initialize logging")?;
    tracing::info!(base_url = config.base_url, "starting mailsweep");

    let session = SessionStore::new(paths::session_path());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(mailsweep_tui::run(&config, session))
}
