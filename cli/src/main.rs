//! Excuse CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`excuse_engine`] (wizard state) and [`excuse_tui`] (rendering),
//! providing RAII-based terminal management with guaranteed cleanup.
//!
//! ```text
//! main() -> Settings::resolve() -> GeminiClient -> TerminalSession::new() -> run_app() -> App + TUI
//! ```
//!
//! Configuration problems (unreadable config file, no API key, invalid model name) are
//! reported on stderr before the terminal is taken over.
//!
//! # Event Loop
//!
//! A fixed 8ms (~120 FPS) render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`excuse_tui::InputPump`])
//! 3. Advance timers (`app.tick()`)
//! 4. Apply finished generation requests
//! 5. Render frame

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use excuse_config::{ExcuseConfig, Settings};
use excuse_engine::{
    App, TextGenerator,
    excuse_providers::{ApiConfig, gemini::GeminiClient},
    ui::UiOptions,
};
use excuse_tui::{InputPump, SystemClipboard, draw, handle_events};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Prefer "no logs" over corrupting the TUI by writing to stdout/stderr.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.excuse/logs/excuse.log
    if let Some(config_path) = ExcuseConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("excuse.log"));
    }

    // Fallback: ./.excuse/logs/excuse.log
    candidates.push(PathBuf::from(".excuse").join("logs").join("excuse.log"));

    candidates
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Enables raw mode, bracketed paste and the alternate screen. On drop all of it is
/// restored, so the terminal stays usable after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableBracketedPaste) {
            let _ = disable_raw_mode();
            let _ = execute!(out, LeaveAlternateScreen, DisableBracketedPaste);
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen, DisableBracketedPaste);
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

fn build_client(settings: &Settings) -> Result<GeminiClient> {
    let mut config = ApiConfig::new(settings.api_key.clone(), settings.model.clone());
    if let Some(base_url) = settings.base_url.as_deref() {
        config = config.with_base_url(base_url);
    }
    GeminiClient::new(config).context("failed to build HTTP client")
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ExcuseConfig::load()?;
    let settings = Settings::resolve(config.as_ref())?;
    tracing::info!(model = %settings.model, language = %settings.language, "Starting");

    let client = build_client(&settings)?;
    let mut app = App::new(Arc::new(client))
        .with_language(settings.language.as_str())
        .with_ui_options(UiOptions {
            ascii_only: settings.ascii_only,
            high_contrast: settings.high_contrast,
        });
    let mut clipboard = SystemClipboard::new();

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app, &mut clipboard).await
    };

    if let Err(err) = &result {
        tracing::error!("{err:?}");
    }
    result
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B, G>(
    terminal: &mut Terminal<B>,
    app: &mut App<G>,
    clipboard: &mut SystemClipboard,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
    G: TextGenerator,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let quit_now = match handle_events(app, &mut input, clipboard) {
            Ok(q) => q,
            Err(e) => break Err(e),
        };
        if quit_now {
            break Ok(());
        }

        app.tick(Instant::now());
        app.poll_generation();

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
