//! Binary entry point that glues the SQLite-backed roster to the TUI: set up
//! logging, make sure the schema exists, load the listing and drive the
//! Ratatui event loop until the user exits.
use std::fs::{self, File};
use std::sync::Mutex;

use anyhow::{Context, Result};
use student_roster::{run_app, App, Config, Roster};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Config::resolve();
    init_logging(&config)?;
    tracing::info!(db = %config.db_path.display(), "student roster starting up");

    let roster = Roster::open(config.db_path.clone()).context("failed to open student database")?;
    let mut app = App::new(roster)?;
    run_app(&mut app)
}

/// Log to a file; stdout belongs to the terminal UI.
fn init_logging(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create log directory")?;
        }
    }
    let log_file = File::options()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("failed to open log file {}", config.log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("student_roster=info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}
