use anyhow::{anyhow, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod config;
mod diagnosis;
mod handler;
mod records;
mod session;
mod tui;
mod ui;
mod wallet;

use app::App;
use config::{Config, DEFAULT_API_URL};
use diagnosis::DiagnoseClient;
use records::PatientRecord;
use wallet::ConfiguredWallet;

#[derive(Parser)]
#[command(name = "medichain")]
#[command(about = "Terminal client for the MediChain AI health assistant")]
struct Cli {
    /// Base URL of the diagnosis service
    #[arg(long)]
    api_url: Option<String>,

    /// Path to a patient record JSON file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Log file path (defaults to the config directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|_| Config::new());

    init_logging(cli.log_file)?;

    let api_url = cli
        .api_url
        .or_else(|| config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let client = DiagnoseClient::new(&api_url);
    tracing::info!(%api_url, "starting medichain");

    let record_path = cli
        .record
        .or_else(|| config.record_path.as_ref().map(PathBuf::from));
    let record = match record_path {
        Some(path) => PatientRecord::load(&path)?,
        None => PatientRecord::sample(),
    };

    let wallet = ConfiguredWallet::new(config.wallet_address.clone());

    let mut app = App::new(client, Box::new(wallet), record);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event).await?,
            None => break,
        }
    }

    tui::restore()?;
    Ok(())
}

/// Log to a file: the terminal itself belongs to the TUI, so diagnostics
/// (failed requests in particular) go to disk instead.
fn init_logging(path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?
            .join("medichain")
            .join("medichain.log"),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::options().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("medichain=info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}
