//! Headless host for the creature simulation.

mod host;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use host::{Host, Viewport};
use robaczki_core::SimConfig;
use robaczki_world::CreatureOptions;
use std::path::PathBuf;
use tokio::signal;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "robaczki", about = "Run the creature and food simulation")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the world seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many frames
    #[arg(short, long)]
    frames: Option<u64>,

    #[arg(long, default_value_t = 1280.0)]
    viewport_width: f64,

    #[arg(long, default_value_t = 800.0)]
    viewport_height: f64,

    /// Creatures added on top of the initial population
    #[arg(long, default_value_t = 0)]
    extra_creatures: usize,

    /// Run frames back to back instead of at the configured rate
    #[arg(long)]
    unpaced: bool,

    /// Print the final world snapshot as JSON
    #[arg(long)]
    dump_snapshot: bool,

    #[arg(long)]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    telemetry::init_telemetry(args.log_json)?;

    let mut config = match &args.config {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    let fps = config.host.frames_per_second;

    info!(seed = config.world.seed, fps = fps, "Starting Robaczki");

    let mut host = Host::new(config);
    host.start(Viewport::new(args.viewport_width, args.viewport_height));

    if let Some(world) = host.world_mut() {
        for _ in 0..args.extra_creatures {
            world.add_creature(CreatureOptions::default());
        }
    }

    let pace = (!args.unpaced).then(|| Duration::from_secs_f64(1.0 / f64::from(fps.max(1))));

    tokio::select! {
        result = run_frame_loop(&mut host, pace, args.frames) => {
            result?;
            info!("Frame limit reached");
        }
        _ = shutdown_signal() => {}
    }

    let world = host
        .world()
        .context("simulation was never started")?;
    let stats = world.stats();
    info!(
        frames = world.frame_count(),
        creatures = world.creatures().len(),
        alive = world.creatures().iter().filter(|c| c.is_alive()).count(),
        food = world.foods().len(),
        food_spawned = stats.food_spawned,
        food_eaten = stats.food_eaten,
        deaths = stats.deaths,
        "Simulation finished"
    );

    if args.dump_snapshot {
        let snapshot = serde_json::to_string_pretty(&world.snapshot())?;
        println!("{}", snapshot);
    }

    Ok(())
}

async fn run_frame_loop(host: &mut Host, pace: Option<Duration>, limit: Option<u64>) -> Result<()> {
    let mut ticker = pace.map(|period| {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });

    loop {
        match ticker.as_mut() {
            Some(ticker) => {
                ticker.tick().await;
            }
            None => tokio::task::yield_now().await,
        }

        let report = host.frame()?;
        if !report.died.is_empty() {
            warn!(frame = report.frame, died = report.died.len(), "Creatures died this frame");
        }
        if !report.consumed.is_empty() || report.spawned.is_some() {
            debug!(?report, "Frame events");
        }

        if limit.is_some_and(|limit| report.frame >= limit) {
            return Ok(());
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
