//! Collision detection between the player and obstacles
//!
//! The decision is an axis-aligned proximity test: the player touches an
//! obstacle when both axis deltas are within `TOUCH_DISTANCE`. Both detector
//! strategies evaluate the exact same predicate over a `Snapshot`.

use glam::Vec2;

use super::obstacle::Obstacle;
use crate::consts::TOUCH_DISTANCE;
use crate::error::ProtocolError;

/// Result of one collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Touching,
    NotTouching,
}

impl Verdict {
    pub fn from_touching(touching: bool) -> Self {
        if touching {
            Verdict::Touching
        } else {
            Verdict::NotTouching
        }
    }

    pub fn is_touching(&self) -> bool {
        *self == Verdict::Touching
    }

    /// Legacy worker reply: `"lose"` on touch, silence otherwise
    pub fn to_wire(&self) -> Option<&'static str> {
        match self {
            Verdict::Touching => Some("lose"),
            Verdict::NotTouching => None,
        }
    }
}

/// Does the player touch this obstacle position?
#[inline]
pub fn touches(player: Vec2, obstacle: Vec2) -> bool {
    (obstacle.x - player.x).abs() <= TOUCH_DISTANCE
        && (obstacle.y - player.y).abs() <= TOUCH_DISTANCE
}

/// Does the player touch any obstacle? Stops at the first match.
pub fn any_touching<I>(player: Vec2, obstacles: I) -> bool
where
    I: IntoIterator<Item = Vec2>,
{
    obstacles.into_iter().any(|o| touches(player, o))
}

/// Positions captured for one frame, in worker wire layout
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Session the positions belong to
    pub generation: u64,
    /// Obstacle coordinates interleaved x0, y0, x1, y1, ...
    pub obstacles: Vec<f32>,
    pub player: Vec2,
}

impl Snapshot {
    pub fn capture(generation: u64, player: Vec2, obstacles: &[Obstacle]) -> Self {
        let mut flat = Vec::with_capacity(obstacles.len() * 2);
        for o in obstacles {
            flat.push(o.pos.x);
            flat.push(o.pos.y);
        }
        Self {
            generation,
            obstacles: flat,
            player,
        }
    }

    /// Run the proximity test over the flat buffer
    ///
    /// Rejects odd-length buffers instead of reading past the last pair.
    pub fn evaluate(&self) -> Result<Verdict, ProtocolError> {
        if self.obstacles.len() % 2 != 0 {
            return Err(ProtocolError::OddLength(self.obstacles.len()));
        }
        let positions = self
            .obstacles
            .chunks_exact(2)
            .map(|pair| Vec2::new(pair[0], pair[1]));
        Ok(Verdict::from_touching(any_touching(self.player, positions)))
    }

    /// Whether any obstacle is close enough vertically to touch the player
    pub fn row_occupied(&self) -> bool {
        self.obstacles
            .chunks_exact(2)
            .any(|pair| (pair[1] - self.player.y).abs() <= TOUCH_DISTANCE)
    }
}

/// A strategy for turning per-frame positions into touching decisions
pub trait CollisionDetector {
    /// Submit this frame's snapshot
    ///
    /// Returns true when a touching verdict for `snapshot.generation` is
    /// available now. Verdicts may lag the snapshot that produced them.
    fn detect(&mut self, snapshot: Snapshot) -> bool;
}

/// Checks in-line on the main loop
#[derive(Debug, Clone, Default)]
pub struct SyncDetector;

impl SyncDetector {
    pub fn new() -> Self {
        Self
    }
}

impl CollisionDetector for SyncDetector {
    fn detect(&mut self, snapshot: Snapshot) -> bool {
        // Nothing shares the player's row; no pair can touch
        if !snapshot.row_occupied() {
            return false;
        }
        match snapshot.evaluate() {
            Ok(verdict) => verdict.is_touching(),
            Err(e) => {
                log::warn!("Skipping collision check: {}", e);
                false
            }
        }
    }
}
