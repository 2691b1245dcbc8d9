//! Lane Crossing entry point
//!
//! Runs the game headless on a software frame buffer. Usage:
//! `lane-crossing [config.json] [--detector offloaded] [--seed 7] [--max-frames 600]`

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use lane_crossing::assets::{DirFetcher, ImageFetcher, PlaceholderFetcher};
use lane_crossing::autopilot::Autopilot;
use lane_crossing::platform::{FixedRateScheduler, Scheduler};
use lane_crossing::renderer::FrameBuffer;
use lane_crossing::sim::Grid;
use lane_crossing::{DetectorMode, Engine, GameConfig, Phase, ResourceCache};

/// How long to wait for sprites before giving up
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "lane-crossing")]
#[command(about = "Headless lane-crossing arcade game", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON config file
    config: Option<PathBuf>,

    /// Collision detector: sync (main) or offloaded (worker)
    #[arg(long, value_parser = parse_detector)]
    detector: Option<DetectorMode>,

    /// Session seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Save the last rendered frame as PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Disable the autopilot
    #[arg(long)]
    manual: bool,
}

fn parse_detector(s: &str) -> Result<DetectorMode, String> {
    DetectorMode::from_str(s).ok_or_else(|| format!("unknown detector '{}'", s))
}

impl Cli {
    /// Load the config file (or defaults) and apply the flags on top
    fn config(&self) -> anyhow::Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GameConfig::default(),
        };
        if let Some(detector) = self.detector {
            config.detector = detector;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.max_frames.is_some() {
            config.max_frames = self.max_frames;
        }
        if self.snapshot.is_some() {
            config.snapshot_path = self.snapshot.clone();
        }
        if self.manual {
            config.autopilot = false;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Lane Crossing (native) starting...");

    let config = Cli::parse().config()?;

    let fetcher: Arc<dyn ImageFetcher> = if config.asset_dir.is_dir() {
        log::info!("Loading sprites from {}", config.asset_dir.display());
        Arc::new(DirFetcher::new(&config.asset_dir))
    } else {
        log::warn!(
            "{} not found, using placeholder sprites",
            config.asset_dir.display()
        );
        Arc::new(PlaceholderFetcher)
    };

    let grid = Grid::default();
    let (width, height) = grid.surface_size();
    let cache = ResourceCache::new(fetcher);
    let mut engine = Engine::new(&config, grid, FrameBuffer::new(width, height), cache)
        .context("starting collision worker")?;

    if !engine.wait_until_ready(LOAD_TIMEOUT) {
        anyhow::bail!(
            "sprites did not load (failed: {:?})",
            engine.cache().failed()
        );
    }

    let input = engine.input_sender();
    let mut autopilot = Autopilot::new();
    let mut scheduler = FixedRateScheduler::new(config.frame_interval(), config.max_frames);

    while let Some(now) = scheduler.next_frame() {
        if config.autopilot && engine.phase() == Phase::Playing {
            if let Some(direction) = autopilot.decide(engine.session(), engine.grid()) {
                input.send(direction);
            }
        }
        engine.frame(now);
    }

    log::info!(
        "Stopped after {} frames ({} fps): {} crossings, {} hits",
        engine.frames(),
        engine.fps(),
        engine.wins(),
        engine.losses()
    );

    if let Some(path) = &config.snapshot_path {
        engine
            .surface()
            .save_png(path)
            .with_context(|| format!("saving frame to {}", path.display()))?;
        log::info!("Saved last frame to {}", path.display());
    }

    Ok(())
}
