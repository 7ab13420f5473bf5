//! `hydrobot-tui`: terminal front-end for the HydroBot camera robot.
//!
//! Built on [ratatui](https://ratatui.rs). Four tabs (Home, Camera,
//! Dashboard, Settings) are navigable with number keys. The Camera tab
//! polls the device while it is shown and stops as soon as it is left.
//!
//! Logs are written to a file under the platform data directory so they
//! never corrupt the terminal UI.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;

const LOG_FILE: &str = "hydrobot-tui.log";

/// Terminal front-end for the HydroBot camera and pump controller.
#[derive(Parser, Debug)]
#[command(name = "hydrobot-tui", version, about)]
struct Cli {
    /// Device address (IP or hostname), overrides the config file
    #[arg(short = 'a', long, env = "HYDROBOT_ADDRESS")]
    address: Option<String>,

    /// Detection server base URL, overrides the config file
    #[arg(long, env = "HYDROBOT_SERVER")]
    server: Option<String>,

    /// Log file path (defaults to the platform data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Stdout/stderr belong to the TUI. The returned
/// guard must be held until exit so buffered lines are flushed.
fn setup_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "hydrobot_tui={log_level},hydrobot_core={log_level},hydrobot_api={log_level}"
        ))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| hydrobot_config::log_dir().join(LOG_FILE));
    let log_dir = log_file
        .parent()
        .map_or_else(|| PathBuf::from("."), PathBuf::from);
    let log_name = log_file
        .file_name()
        .map_or_else(|| LOG_FILE.into(), std::ffi::OsStr::to_os_string);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks first, so a panic during startup still restores the terminal.
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli)?;

    // Flags win over file and env; a broken config file is reported
    // before the terminal is taken over.
    let mut config = hydrobot_config::load_config()?;
    if let Some(address) = cli.address {
        config.device.address = address;
    }
    if let Some(server) = cli.server {
        config.detection.server = server;
    }

    info!(address = %config.device.address, server = %config.detection.server, "starting hydrobot-tui");

    let mut app = App::new(&config)?;
    app.run().await?;

    Ok(())
}
