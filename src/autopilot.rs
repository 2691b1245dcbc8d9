//! Demo driver for runs without a keyboard
//!
//! Steps up whenever the row ahead is clear of obstacles that could reach
//! the player before the next decision, otherwise waits in place.

use crate::consts::{OBSTACLE_MAX_SPEED, TOUCH_DISTANCE};
use crate::platform::Direction;
use crate::sim::{Grid, Session, touches};

/// Frames between decisions
const DECISION_INTERVAL: u32 = 12;
/// How far ahead (seconds) an approaching obstacle counts as a threat
const LOOKAHEAD_SECS: f32 = 0.35;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    cooldown: u32,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call once per frame; returns a move when one should be made
    pub fn decide(&mut self, session: &Session, grid: &Grid) -> Option<Direction> {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return None;
        }

        let player = session.player.pos();
        let mut target = player;
        target.y -= grid.cell_height;
        if !session.player.range_y().contains(target.y) {
            return None;
        }

        // Anything that could drive into the target cell soon
        let reach = OBSTACLE_MAX_SPEED as f32 * LOOKAHEAD_SECS;
        let threatened = session.obstacles.iter().any(|o| {
            let closing = o.pos.x <= target.x && target.x - o.pos.x <= reach + TOUCH_DISTANCE;
            touches(target, o.pos) || ((o.pos.y - target.y).abs() <= TOUCH_DISTANCE && closing)
        });
        if threatened {
            return None;
        }

        self.cooldown = DECISION_INTERVAL;
        Some(Direction::Up)
    }
}
