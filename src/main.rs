//! streamchat - entry point.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use streamchat::config::{self, CliOverrides};
use streamchat::dispatch::EventMarshal;
use streamchat::engine::{ChatEngine, DemoEngine};
use streamchat::model::ClientSettings;
use streamchat::state::StreamPresenter;
use tracing::{info, warn};

/// TUI client for live-stream chat.
#[derive(Parser, Debug)]
#[command(name = "streamchat")]
#[command(version)]
#[command(about = "TUI client for live-stream chat")]
pub struct Args {
    /// Path to the configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the muted-user settings document
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Comment pool capacity
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Demo feed cadence in milliseconds
    #[arg(long)]
    pub demo_interval_ms: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Full precedence chain: Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = config::load_config_with_precedence(args.config.clone())?;
        let merged = config::merge_config(config_file);
        let with_env = config::apply_env_overrides(merged);
        config::apply_cli_overrides(
            with_env,
            CliOverrides {
                settings_path: args.settings.clone(),
                pool_capacity: args.capacity,
                demo_interval_ms: args.demo_interval_ms,
            },
        )
    };

    streamchat::logging::init(&config.log_file_path)?;
    info!(config = ?config, "configuration loaded and resolved");

    let settings = ClientSettings::load(&config.settings_path)?;
    info!(muted = settings.muted_users.len(), "settings loaded");

    // The owner loop drains this channel; the engine feeds it from its
    // own threads.
    let (sink, marshal) = EventMarshal::channel();
    let engine: Arc<dyn ChatEngine> = Arc::new(DemoEngine::new(
        sink,
        Duration::from_millis(config.demo_interval_ms),
    ));

    let presenter = StreamPresenter::with_pool(
        engine.clone(),
        settings,
        config.pool_capacity,
        config.eviction_margin,
    );

    engine.connect()?;
    engine.load_stream_info();

    let presenter = streamchat::view::run(presenter, marshal, engine.clone())?;

    engine.disconnect();
    if let Err(err) = engine.save_state() {
        warn!(%err, "engine state not saved");
    }
    if let Err(err) = presenter.settings().save(&config.settings_path) {
        warn!(%err, "settings not saved");
    }
    info!("shut down cleanly");

    Ok(())
}
