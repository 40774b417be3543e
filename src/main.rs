//! prompt-click: pick stored text snippets and paste them into the focused window
//!
//! Captures the active window, shows a picker at the pointer, and on confirm
//! writes the selection to the clipboard, restores focus and pastes.

#![forbid(unsafe_code)]

mod config;
mod constants;
mod desktop;
mod error;
mod gui;
mod handoff;
mod placement;
mod session;
mod x11_utils;

use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::JsonFileStore;
use desktop::X11Desktop;
use gui::PickerOutcome;
use handoff::Handoff;
use session::Session;

#[derive(Parser)]
#[command(name = "prompt-click")]
#[command(about = "Pick stored strings and paste them into the focused window")]
#[command(version)]
struct Cli {
    /// Document location (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stop after writing the clipboard: no focus restore, no keystroke
    #[arg(long)]
    no_paste: bool,

    /// Also write the composed text to stdout
    #[arg(long)]
    print: bool,

    /// Upper bound for each external call, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = constants::handoff::DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,
}

fn init_logging() -> Result<()> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // stderr keeps stdout clean for --print
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let store = JsonFileStore::new(cli.config.unwrap_or_else(JsonFileStore::default_path));
    info!(path = %store.path().display(), "Using document");

    // Capture focus before any window of ours exists
    let desktop = X11Desktop::new(Duration::from_millis(cli.timeout_ms))?;
    let placement = desktop.pointer_and_screen();
    let mut handoff = Handoff::capture(desktop);
    if cli.no_paste {
        info!(previous = ?handoff.previous_window(), "Paste disabled, previous window will not be re-activated");
        handoff = handoff.clipboard_only();
    }

    let session = Session::new(Box::new(store));

    match gui::run_picker(session, handoff, placement)? {
        PickerOutcome::Deliver { text, pending } => {
            if cli.print {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{text}")?;
                stdout.flush()?;
            }
            if !pending.report().clipboard {
                warn!("Clipboard write failed, the paste may insert stale contents");
            }
            let report = pending.complete();
            info!(?report, "Handoff finished");
        }
        PickerOutcome::Cancelled => info!("Picker cancelled, nothing delivered"),
    }

    Ok(())
}
