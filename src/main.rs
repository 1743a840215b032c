//! Cosmic Navigator - Birth Chart Intake
//!
//! A terminal form that walks the user through personal details, birth date,
//! time and place, and a final review, then submits the answers to a webhook.
//! Progress is autosaved and restored on the next launch.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use cosmicnav::application::{App, AppMode};
use cosmicnav::infrastructure::{
    default_config_path, init_logging, Config, FileStore, FormPersistence, HttpSubmitter,
    KeyValueStore, MemoryStore, Submitter, SystemClock, Unconfigured,
};
use cosmicnav::presentation::{render_ui, InputHandler};

/// How often the event loop wakes up to run autosave and check on submissions.
const TICK_RATE: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(name = "cosmicnav", version, about = "Birth chart intake form")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = "COSMICNAV_CONFIG")]
    config: Option<PathBuf>,

    /// Webhook that receives completed forms
    #[arg(long, env = "WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// File holding autosaved progress
    #[arg(long)]
    storage: Option<PathBuf>,

    /// File receiving log output
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Entry point for the Cosmic Navigator terminal form.
///
/// Loads configuration, sets up logging and storage, then runs the UI until
/// the user quits.
///
/// # Errors
///
/// Returns an error if logging or the terminal cannot be set up.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = Config::load_or_default(&config_path);
    if cli.webhook_url.is_some() {
        config.webhook_url = cli.webhook_url;
    }
    if let Some(storage) = cli.storage {
        config.storage_path = storage;
    }
    if let Some(log_file) = cli.log_file {
        config.log_path = log_file;
    }

    init_logging(&config.log_path)
        .with_context(|| format!("failed to set up logging at {}", config.log_path.display()))?;
    tracing::info!(
        storage = %config.storage_path.display(),
        webhook_configured = config.webhook_url.is_some(),
        "Starting cosmicnav"
    );

    let store: Box<dyn KeyValueStore> = match FileStore::open(&config.storage_path) {
        Ok(store) => Box::new(store),
        Err(err) => {
            tracing::warn!(
                "Cannot open {}: {err}; progress will not survive a restart",
                config.storage_path.display()
            );
            Box::new(MemoryStore::new())
        }
    };

    let submitter: Arc<dyn Submitter> = match &config.webhook_url {
        Some(url) => Arc::new(
            HttpSubmitter::new(url.as_str()).context("failed to build the webhook client")?,
        ),
        None => {
            tracing::warn!("No webhook configured; submissions will fail");
            Arc::new(Unconfigured)
        }
    };

    let mut app = App::new(
        FormPersistence::new(store),
        submitter,
        Box::new(SystemClock),
        config.autosave_interval(),
        config.reset_grace(),
    );

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("UI loop failed: {err}");
        println!("{err:?}");
    }

    Ok(())
}

/// Main application event loop.
///
/// Redraws, waits up to one tick for a key press, then lets the app run its
/// periodic work. Continues until the user presses 'q' in normal mode.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => {
                            if app.request_quit() {
                                return Ok(());
                            }
                        }
                        _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                    }
                }
            }
        }

        app.tick();
    }
}
