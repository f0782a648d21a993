mod action;
mod app;
mod config;
mod detail;
mod error;
mod event;
mod fetch;
mod gallery;
mod picsum;
mod source;
mod tui;
mod types;
mod ui;
mod viewport;

use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{ArgAction, Parser};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::config::Config;
use crate::event::Event;
use crate::picsum::Picsum;
use crate::source::PhotoSource;
use crate::tui::EventHandler;

#[derive(Debug, Parser)]
#[command(name = "pixgrid", version, about = "Browse Lorem Picsum photos in the terminal")]
struct Cli {
    /// Config file (defaults to ~/.config/pixgrid/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Catalogue base URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Photos per page
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Open this photo's detail view on start
    #[arg(long, value_name = "ID")]
    photo: Option<String>,

    /// Write logs to this file (defaults to the cache directory)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

/// Where logs go. The terminal belongs to the UI while it runs, so
/// without `--log-file` logs land in the cache directory.
fn log_path(cli: &Cli) -> Option<PathBuf> {
    cli.log_file
        .clone()
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("pixgrid").join("pixgrid.log")))
}

fn init_tracing(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let writer: Box<dyn std::io::Write + Send> = match log_path(cli) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Box::new(std::fs::File::create(path)?)
        }
        None => Box::new(std::io::sink()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(writer)),
        )
        .init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }
    if let Some(page_size) = cli.page_size.filter(|n| *n > 0) {
        config.api.page_size = page_size;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config = load_config(&cli)?;
    info!(
        base_url = %config.api.base_url,
        page_size = config.api.page_size,
        "starting"
    );

    let source: Arc<dyn PhotoSource> =
        Arc::new(Picsum::new(&config.api.base_url, config.timeout())?);

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let result = run(source, config, cli.photo).await;

    tui::restore()?;

    result
}

async fn run(
    source: Arc<dyn PhotoSource>,
    config: Config,
    initial_photo: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(source, &config, action_tx.clone()).with_initial_photo(initial_photo);
    let (width, height) = crossterm::terminal::size()?;
    app.update(Action::Resize(width, height));

    let tick_rate = Duration::from_millis(100);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
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
