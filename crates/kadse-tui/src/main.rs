mod action;
mod app;
mod app_state;
mod component;
mod components;
mod focus;
mod theme;
mod widgets;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use kadse_core::config::Config;
use kadse_core::controller::Controller;
use kadse_core::platform;
use kadse_core::process::{ProcessRunner, ToolCommand};
use kadse_core::settings::SettingsStore;
use kadse_core::streams::StreamListStore;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal front end for streamlink", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/kadse/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Saved stream list (JSON array of URLs)
    #[arg(long)]
    streams_file: Option<PathBuf>,

    /// Settings file holding the player path
    #[arg(long)]
    settings_file: Option<PathBuf>,

    /// Streaming tool binary, e.g. streamlink or livestreamer
    #[arg(long, env = "KADSE_TOOL")]
    tool: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;
    let log_path = data_dir.join("kadse.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,kadse=debug,kadse_core=debug".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("kadse log: {}", log_path.display());
    tracing::info!("kadse starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Some(path) = cli.streams_file {
        config.paths.streams_file = path;
    }
    if let Some(path) = cli.settings_file {
        config.paths.settings_file = path;
    }
    if let Some(tool) = cli.tool {
        config.tool.binary = tool;
    }
    tracing::debug!("config: {:?}", config);

    // ── Stores ───────────────────────────────────────────────────────────────
    let streams = StreamListStore::load(&config.paths.streams_file)
        .with_context(|| format!("loading {}", config.paths.streams_file.display()))?;
    let settings = SettingsStore::load(&config.paths.settings_file)
        .with_context(|| format!("loading {}", config.paths.settings_file.display()))?;
    tracing::info!(
        "{} saved streams, player {:?}",
        streams.len(),
        settings.player_path()
    );

    // ── Process runner ───────────────────────────────────────────────────────
    let binary = platform::resolve_tool_binary(&config.tool.binary);
    tracing::info!("using tool {}", binary.display());
    let tool = ToolCommand::new(binary).with_extra_args(config.tool.extra_args.clone());
    let (process_tx, process_rx) = mpsc::channel(1024);
    let runner = ProcessRunner::new(tool, config.tool.discovery_timeout(), process_tx);

    let controller = Controller::new(streams, settings, runner.tool().name());

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(app_state::AppState::new(controller), runner);
    app.run(process_rx).await?;

    Ok(())
}
