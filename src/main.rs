mod action;
mod app;
mod auth;
mod config;
mod controller;
mod error;
mod event;
mod host;
mod mount;
mod source;
mod tui;
mod twitter;
mod types;
mod ui;
mod url_match;

use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::source::QuoteSource;
use crate::tui::EventHandler;
use crate::twitter::TwitterApi;

/// Browse the quote tweets of an X post from the terminal.
#[derive(Parser, Debug)]
#[command(name = "quotebox", version, about)]
struct Cli {
    /// Page to open first, e.g. https://x.com/jack/status/20
    url: Option<String>,

    /// Config file (default: ~/.config/quotebox/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Quotes per page (10-100)
    #[arg(long)]
    page_size: Option<u32>,

    /// Region the quote panel mounts into
    #[arg(long)]
    anchor: Option<String>,

    /// Log file (default: ~/.cache/quotebox/quotebox.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(log_path(cli.log_file.as_deref()).as_deref())?;

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    apply_overrides(&mut config, &cli);
    config.validate()?;

    let token = auth::load_bearer_token(&config.api)?;
    let source: Arc<dyn QuoteSource> = Arc::new(TwitterApi::new(&config.api, token)?);
    info!(source = source.name(), anchor = %config.page.anchor, "starting quotebox");

    // Run the application
    let result = run(source, config, cli.url).await;

    // Restore terminal
    tui::restore()?;

    result
}

/// Where logs go: the `--log-file` path, else the cache dir. Never the
/// terminal, which the UI owns.
fn log_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(dirs::cache_dir()?.join("quotebox").join("quotebox.log")),
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    // No writable location means no logging
    let Some(path) = log_file else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file)),
        )
        .init();
    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(page_size) = cli.page_size {
        config.api.page_size = page_size;
    }
    if let Some(anchor) = &cli.anchor {
        config.page.anchor = anchor.clone();
    }
}

async fn run(
    source: Arc<dyn QuoteSource>,
    config: Config,
    initial_url: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize terminal
    let mut terminal = tui::init()?;

    // Create action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    // Create app state
    let mut app = App::new(source, &config, action_tx.clone());

    // Create event handler
    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    if let Some(url) = initial_url {
        events.navigate(url);
    }

    // Main loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    app.update(Action::Quit);
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
