//! Obstacles crossing the lanes
//!
//! Each obstacle travels left to right at a constant speed for one traversal,
//! then respawns off-screen on a random lane with a fresh speed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::Grid;
use crate::assets::ResourceCache;
use crate::consts::*;
use crate::renderer::Surface;
use crate::sprites;

/// An obstacle entity
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub pos: Vec2,
    /// Speed for the current traversal; rolled on first need
    speed: Option<f32>,
    lanes: [f32; LANE_COUNT],
    max_x: f32,
    rng: Pcg32,
}

impl Obstacle {
    /// Spawn off-screen on a random lane
    pub fn new(grid: &Grid, seed: u64) -> Self {
        let mut obstacle = Self {
            pos: Vec2::ZERO,
            speed: None,
            lanes: grid.lanes(),
            max_x: grid.max_x(),
            rng: Pcg32::seed_from_u64(seed),
        };
        obstacle.respawn();
        obstacle
    }

    /// Current speed, rolling a new one if this traversal has none yet
    pub fn speed(&mut self) -> f32 {
        if let Some(speed) = self.speed {
            return speed;
        }
        let speed = self.rng.random_range(OBSTACLE_MIN_SPEED..OBSTACLE_MAX_SPEED) as f32;
        self.speed = Some(speed);
        speed
    }

    /// Speed without rolling (None until first needed)
    pub fn current_speed(&self) -> Option<f32> {
        self.speed
    }

    /// Drop the current speed so the next traversal rolls a fresh one
    pub fn invalidate_speed(&mut self) {
        self.speed = None;
    }

    /// Advance along the lane, wrapping once fully past the right edge
    ///
    /// Returns true if the obstacle wrapped.
    pub fn update(&mut self, dt: f32) -> bool {
        let next_x = self.pos.x + self.speed() * dt;
        if next_x <= self.max_x + WRAP_MARGIN {
            self.pos.x = next_x;
            false
        } else {
            self.invalidate_speed();
            self.respawn();
            log::debug!("Obstacle wrapped onto lane y={}", self.pos.y);
            true
        }
    }

    pub fn render(&self, surface: &mut dyn Surface, cache: &ResourceCache) {
        if let Some(sprite) = cache.sprite(sprites::ENEMY) {
            surface.draw_sprite(sprite, self.pos.x, self.pos.y);
        }
    }

    /// Back to the off-screen start on a uniformly chosen lane
    fn respawn(&mut self) {
        let lane = self.rng.random_range(0..self.lanes.len());
        self.pos = Vec2::new(OBSTACLE_START_X, self.lanes[lane]);
    }
}
