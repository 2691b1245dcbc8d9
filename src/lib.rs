//! Lane Crossing - a grid-based lane-crossing arcade game
//!
//! Core modules:
//! - `sim`: Entity model (obstacles, player token, collision detection, signals)
//! - `assets`: Asynchronous sprite cache with a readiness gate
//! - `renderer`: Drawing surface contract and a software frame buffer
//! - `platform`: Frame scheduling and directional input
//! - `engine`: The game loop tying it all together

pub mod assets;
pub mod autopilot;
pub mod engine;
pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use assets::{Resource, ResourceCache, Sprite, SpriteHandle};
pub use engine::{Engine, Phase};
pub use error::{ConfigError, LoadError, ProtocolError};
pub use settings::{DetectorMode, GameConfig};

/// Game configuration constants
pub mod consts {
    /// Default grid layout
    pub const COLUMNS: u32 = 5;
    pub const ROWS: u32 = 6;
    pub const CELL_WIDTH: f32 = 101.0;
    pub const CELL_HEIGHT: f32 = 83.0;

    /// Number of horizontal lanes obstacles travel along
    pub const LANE_COUNT: usize = 3;
    /// Lane sprites sit this far above the cell boundary
    pub const LANE_Y_OFFSET: f32 = 20.0;

    /// Obstacle defaults
    pub const DEFAULT_OBSTACLE_COUNT: usize = 5;
    /// Obstacles respawn off-screen to the left
    pub const OBSTACLE_START_X: f32 = -100.0;
    /// Extra distance past the right edge before an obstacle wraps (about half a cell)
    pub const WRAP_MARGIN: f32 = 50.0;
    /// Obstacle speed is rolled as an integer in [MIN, MAX) pixels/s
    pub const OBSTACLE_MIN_SPEED: u32 = 100;
    pub const OBSTACLE_MAX_SPEED: u32 = 400;

    /// Player start cell
    pub const PLAYER_START_COLUMN: u32 = 2;
    /// Player sprite sits this far above the cell boundary
    pub const PLAYER_Y_OFFSET: f32 = 10.0;

    /// Collision proximity threshold on each axis (pixels, inclusive)
    pub const TOUCH_DISTANCE: f32 = 30.0;
}

/// Sprite identifiers requested at startup
pub mod sprites {
    pub const WATER: &str = "water-block.png";
    pub const STONE: &str = "stone-block.png";
    pub const GRASS: &str = "grass-block.png";
    pub const ENEMY: &str = "enemy-bug.png";
    pub const PLAYER: &str = "char-boy.png";

    /// Every sprite the game needs before it can start
    pub const ALL: [&str; 5] = [STONE, WATER, GRASS, ENEMY, PLAYER];

    /// Background sprite per grid row, top to bottom
    pub const ROW_BACKGROUND: [&str; 6] = [WATER, STONE, STONE, STONE, GRASS, GRASS];
}
