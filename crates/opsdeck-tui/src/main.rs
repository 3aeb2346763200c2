//! opsdeck - a terminal client for the operations automation platform.
//!
//! Without arguments this starts the terminal UI; `login`, `logout`,
//! `whoami` and `status` run as one-shot commands.

mod app;
mod cli;
mod host;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use opsdeck_core::Config;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use cli::Command;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix in the data directory (TUI mode)
const LOG_FILE_PREFIX: &str = "opsdeck.log";

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr for one-shot commands.
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// The UI owns the terminal, so TUI mode logs to a daily file instead.
/// The returned guard flushes the writer on drop.
fn init_file_tracing(config: &Config) -> Option<WorkerGuard> {
    let dir = config.data_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Some(guard)
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    if let Some(command) = command {
        init_stderr_tracing();
        return cli::run(command, load_config()).await;
    }

    let config = load_config();
    let _log_guard = init_file_tracing(&config);
    info!("opsdeck starting");

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("opsdeck shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll with a timeout so redirects and notifications update unprompted
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.tick();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
