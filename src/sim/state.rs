//! Session state and game signals
//!
//! A session is the set of entities built by one reset. Sessions are never
//! patched across a reset; the engine discards them wholesale.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Snapshot;
use super::grid::Grid;
use super::obstacle::Obstacle;
use super::player::Player;

/// Notifications raised by entities and detectors for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSignal {
    /// Player reached the far edge; rebuild the session
    Win,
    /// Player touched an obstacle; send the player back to start
    Lose,
}

/// A queue that the update step pushes to and the engine drains
#[derive(Debug, Default)]
pub struct EventBus {
    signals: Vec<GameSignal>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: GameSignal) {
        self.signals.push(signal);
    }

    /// Take all pending signals in the order they were raised
    pub fn drain(&mut self) -> Vec<GameSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }
}

/// One game session's entities
#[derive(Debug, Clone)]
pub struct Session {
    /// Advances on every reset, including player-only ones; tags collision snapshots
    pub generation: u64,
    pub obstacles: Vec<Obstacle>,
    pub player: Player,
}

impl Session {
    /// Build a fresh session; obstacles draw their generators from `seed`
    pub fn new(grid: &Grid, obstacle_count: usize, generation: u64, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let obstacles = (0..obstacle_count)
            .map(|_| Obstacle::new(grid, rng.random()))
            .collect();
        Self {
            generation,
            obstacles,
            player: Player::new(grid),
        }
    }

    /// Send the player back to start under a new generation
    ///
    /// Verdicts computed before this call no longer match the session.
    pub fn reset_player(&mut self, generation: u64) {
        self.generation = generation;
        self.player.reset_coordinate();
    }

    /// Positions for the collision detector
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.generation, self.player.pos(), &self.obstacles)
    }
}
