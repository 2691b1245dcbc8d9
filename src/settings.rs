//! Game configuration
//!
//! Read from a JSON file on native; every field falls back to its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_OBSTACLE_COUNT;
use crate::error::ConfigError;

/// Which collision detector the engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectorMode {
    /// Checked in-line with every update
    #[default]
    Sync,
    /// Checked on a background worker thread, one frame of latency
    Offloaded,
}

impl DetectorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorMode::Sync => "sync",
            DetectorMode::Offloaded => "offloaded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sync" | "main" => Some(DetectorMode::Sync),
            "offloaded" | "worker" => Some(DetectorMode::Offloaded),
            _ => None,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Obstacles spawned per session
    pub obstacle_count: usize,
    /// Collision detection strategy
    pub detector: DetectorMode,
    /// Session seed (random when absent)
    pub seed: Option<u64>,

    // === Loop ===
    /// Frames per second the native scheduler aims for
    pub target_fps: u32,
    /// Stop after this many frames (headless runs)
    pub max_frames: Option<u64>,

    // === Assets ===
    /// Directory holding the sprite PNGs
    pub asset_dir: PathBuf,
    /// Save the last rendered frame here
    pub snapshot_path: Option<PathBuf>,

    /// Drive the player with the autopilot instead of a keyboard
    pub autopilot: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            obstacle_count: DEFAULT_OBSTACLE_COUNT,
            detector: DetectorMode::Sync,
            seed: None,

            target_fps: 60,
            max_frames: None,

            asset_dir: PathBuf::from("images"),
            snapshot_path: None,

            autopilot: true,
        }
    }
}

impl GameConfig {
    /// Read a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Read a config file, falling back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default config ({})", e);
                Self::default()
            }
        }
    }

    /// Write the config as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Frame interval the scheduler aims for
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}
