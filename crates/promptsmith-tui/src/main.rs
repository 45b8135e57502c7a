use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use promptsmith_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

const LOG_FILE: &str = "promptsmith.log";

#[derive(Parser)]
#[command(name = "promptsmith")]
#[command(about = "Describe your business and get a ready-to-use AI assistant prompt", long_about = None)]
#[command(version)]
struct Cli {
    /// Generation mode: "local" (built-in template) or "remote" (generation service)
    #[arg(short, long)]
    mode: Option<String>,

    /// Base URL of the generation service
    #[arg(long)]
    service_url: Option<String>,

    /// Simulated delay for local generation, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Request timeout for the generation service, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory where saved prompts are written
    #[arg(long)]
    download_dir: Option<PathBuf>,

    /// Persist the effective settings to the config file
    #[arg(long)]
    save_config: bool,
}

impl Cli {
    /// Flags win over the environment and the config file.
    fn apply(&self, config: &mut Config) {
        if let Some(mode) = &self.mode {
            config.mode = Some(mode.clone());
        }
        if let Some(url) = &self.service_url {
            config.service_url = Some(url.clone());
        }
        if let Some(delay) = self.delay_ms {
            config.simulated_delay_ms = Some(delay);
        }
        if let Some(timeout) = self.timeout_secs {
            config.request_timeout_secs = Some(timeout);
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir = Some(dir.clone());
        }
    }
}

/// Log to a file; anything written to the terminal would corrupt the UI.
fn init_tracing() -> Result<()> {
    let log_dir = Config::config_dir()?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Could not create {}", log_dir.display()))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let mut config = Config::load().context("Failed to load config")?;
    config.apply_env();
    cli.apply(&mut config);
    if cli.save_config {
        config.save().context("Failed to save config")?;
    }

    let mut app = App::new(&config)?;
    tracing::info!(mode = app.mode().as_str(), service_url = %app.service_url, "Starting promptsmith");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "promptsmith exited with an error");
    }
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(tui::TICK_RATE);
    app.ensure_session();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
