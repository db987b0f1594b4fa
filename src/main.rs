//! discovery-feed — an infinite-scroll discovery feed for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  FetchMsg  ┌──────────┐  draw()  ┌──────────┐
//! │ fetch.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (tokio)  │ ◄───────── │ (state)  │          │ (render) │
//! └──────────┘    Job     └──────────┘          └──────────┘
//!                              ▲
//!                              │ handle_event()
//!                         ┌──────────┐
//!                         │ input.rs │
//!                         └──────────┘
//! ```
//!
//! * **`source/`** — the `ContentSource` trait, the `Item` card type and the
//!   randomized mock source.
//! * **`feed`** — the page cursor, loading guards and refresh snapshot.
//! * **`media`** — failed media tracking and the simulated media probe.
//! * **`overlay`** — the full-screen video player state.
//! * **`fetch`** — runs page fetches and probes on the tokio runtime.
//! * **`scroll`** — turns list position into near-bottom / at-top signals.
//! * **`app`** — owns all application state and routes UI events.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key and mouse events to `App` gestures.
//! * **`main`** — wires everything together: parse args, load config, set up
//!   logging and the terminal, and run the event loop.

mod app;
mod cli;
mod config;
mod error;
mod feed;
mod fetch;
mod input;
mod media;
mod notice;
mod overlay;
mod scroll;
mod source;
mod ui;

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{fmt, EnvFilter};

use app::App;
use cli::Args;
use config::Config;
use fetch::Fetcher;
use media::{MediaProbe, MockProbe};
use source::{ContentSource, Format, MockSource};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages raw mode, the alternate screen and mouse capture via [`Drop`].
///
/// Constructing this struct subscribes the process to terminal input;
/// dropping it (normally, on an early `?` return, or during unwinding)
/// releases every subscription and restores the terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Send logs to `path`.  Without a path nothing is installed: writing to
/// stderr would draw over the UI.
fn init_logging(path: Option<&Path>, debug: bool) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    args.merge_into_config(&mut config);
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // -- parse arguments and configuration -----------------------------------
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.debug)?;
    let config = load_config(&args)?;

    install_panic_hook();

    // -- background work runs on tokio; the UI loop stays synchronous --------
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the tokio runtime")?;

    let source: Arc<dyn ContentSource> = Arc::new(MockSource::new(&config.source));
    let probe: Arc<dyn MediaProbe> = Arc::new(MockProbe::new(&config.media, config.source.seed));
    let (fetcher, mut rx) = Fetcher::new(
        runtime.handle().clone(),
        source,
        probe,
        config.source.timeout(),
    );
    tracing::info!(source = fetcher.source_name(), format = %config.source.format, "starting feed");

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(&config.feed, &Format::ALL, config.source.format);
    app.mount();

    // -- main event loop -----------------------------------------------------
    // Each iteration:
    //   1. Drain finished fetches and probes, expire notices.
    //   2. Render the UI (which may queue media probes).
    //   3. Poll for input (non-blocking, up to tick_rate).
    //   Jobs are handed to the fetcher after every step that can create them.
    let tick_rate = config.feed.tick_rate();

    loop {
        // 1. Process background results
        while let Ok(msg) = rx.try_recv() {
            app.apply(msg, Instant::now());
        }
        app.tick(Instant::now());

        // 2. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;
        for job in app.take_jobs() {
            fetcher.dispatch(job);
        }

        // 3. Handle input
        if event::poll(tick_rate)? {
            input::handle_event(&mut app, event::read()?);
            for job in app.take_jobs() {
                fetcher.dispatch(job);
            }
        }

        if app.quit {
            break;
        }
    }

    // Restore the terminal before waiting on in-flight tasks.
    drop(guard);
    runtime.shutdown_timeout(Duration::from_millis(200));
    tracing::info!("feed closed");
    Ok(())
}
