/// Blockstar intro - headless front screen runner
///
/// Drives the front screen's lifecycle (created, shown, hidden, torn down)
/// against the simulated audio host and logs every music transition.
use anyhow::{bail, Context};
use blockstar_music::{
    MusicConfig, PlaybackManager, PlaybackState, ReadyDispatch, ScreenLifecycle, SimulatedHost,
};
use clap::Parser;
use std::{path::PathBuf, sync::Arc, thread, time::Duration, time::Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "blockstar-intro")]
#[command(about = "Run the Blockstar front screen lifecycle headlessly", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BLOCKSTAR_CONFIG", default_value = "blockstar.toml")]
    config: PathBuf,

    /// Number of hide/show cycles to run before tearing the screen down
    #[arg(long, default_value_t = 2)]
    cycles: u32,

    /// Simulated track preparation time in milliseconds
    #[arg(long, default_value_t = 50)]
    prepare_delay_ms: u64,

    /// Maximum music stream gain reported by the simulated device
    #[arg(long, default_value_t = 15.0)]
    max_stream_gain: f32,
}

/// How long to wait for the simulated host to prepare a track
const READY_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blockstar_music=debug,blockstar_intro=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = MusicConfig::load(Some(&cli.config)).context("Failed to load configuration")?;
    tracing::info!("Starting Blockstar intro");
    tracing::info!("Volume: {}%", config.volume_percent);
    tracing::info!("Bundled tracks: {}", config.tracks.len());

    let host = SimulatedHost::new()
        .with_max_stream_gain(cli.max_stream_gain)
        .with_dispatch(ReadyDispatch::Background(Duration::from_millis(
            cli.prepare_delay_ms,
        )));
    let manager = Arc::new(PlaybackManager::from_config(&config));
    let screen = ScreenLifecycle::new(
        Arc::clone(&manager),
        Arc::new(host.clone()),
        config.volume_percent,
    );

    screen.on_screen_created()?;
    screen.on_screen_shown()?;
    wait_for(&manager, PlaybackState::Playing)?;
    log_now_playing(&manager)?;

    for cycle in 1..=cli.cycles {
        tracing::info!("Cycle {}: screen hidden", cycle);
        screen.on_screen_hidden()?;
        tracing::info!("Music state: {:?}", manager.state());

        tracing::info!("Cycle {}: screen shown", cycle);
        screen.on_screen_shown()?;
        wait_for(&manager, PlaybackState::Playing)?;
    }

    screen.on_screen_torn_down();
    tracing::info!(
        "Screen torn down: {} players created, {} still live",
        host.players_created(),
        host.live_players()
    );

    if host.live_players() != 0 {
        bail!("{} native players leaked", host.live_players());
    }
    Ok(())
}

fn wait_for(manager: &PlaybackManager, state: PlaybackState) -> anyhow::Result<()> {
    let deadline = Instant::now() + READY_TIMEOUT;
    while manager.state() != state {
        if Instant::now() >= deadline {
            bail!(
                "Timed out waiting for {:?} (currently {:?})",
                state,
                manager.state()
            );
        }
        thread::sleep(Duration::from_millis(5));
    }
    Ok(())
}

fn log_now_playing(manager: &PlaybackManager) -> anyhow::Result<()> {
    if let Some(now) = manager.now_playing()? {
        tracing::info!(
            "Now playing {} #{} ({}) at gain {:.2}",
            now.category,
            now.index,
            now.handle,
            manager.gain()?
        );
    }
    Ok(())
}
