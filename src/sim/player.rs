//! The player token
//!
//! Moves one whole cell per input and never leaves its allowed range; a move
//! that would is dropped rather than clamped.

use glam::Vec2;

use super::grid::Grid;
use crate::assets::ResourceCache;
use crate::platform::Direction;
use crate::renderer::Surface;
use crate::sprites;

/// What a move request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Position changed
    Moved,
    /// Candidate cell was out of range; nothing changed
    Blocked,
    /// Moved up into the top row
    Won,
}

/// Inclusive range along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

/// The player entity
#[derive(Debug, Clone)]
pub struct Player {
    pos: Vec2,
    start: Vec2,
    step: Vec2,
    range_x: Range,
    range_y: Range,
    win_line: f32,
}

impl Player {
    pub fn new(grid: &Grid) -> Self {
        let start = grid.player_start();
        Self {
            pos: start,
            start,
            step: Vec2::new(grid.cell_width, grid.cell_height),
            range_x: Range {
                min: 0.0,
                max: (grid.columns.saturating_sub(1)) as f32 * grid.cell_width,
            },
            range_y: Range {
                min: start.y - (grid.rows.saturating_sub(1)) as f32 * grid.cell_height,
                max: start.y,
            },
            win_line: grid.win_line(),
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn range_x(&self) -> Range {
        self.range_x
    }

    pub fn range_y(&self) -> Range {
        self.range_y
    }

    /// Step one cell in `direction` if the target cell is in range
    pub fn move_toward(&mut self, direction: Direction) -> MoveOutcome {
        let offset = match direction {
            Direction::Up => Vec2::new(0.0, -self.step.y),
            Direction::Down => Vec2::new(0.0, self.step.y),
            Direction::Left => Vec2::new(-self.step.x, 0.0),
            Direction::Right => Vec2::new(self.step.x, 0.0),
        };
        let candidate = self.pos + offset;

        if !self.range_x.contains(candidate.x) || !self.range_y.contains(candidate.y) {
            log::debug!("Move {:?} blocked at ({}, {})", direction, self.pos.x, self.pos.y);
            return MoveOutcome::Blocked;
        }

        self.pos = candidate;
        if direction == Direction::Up && self.pos.y < self.win_line {
            MoveOutcome::Won
        } else {
            MoveOutcome::Moved
        }
    }

    /// Back to the start cell (lose path)
    pub fn reset_coordinate(&mut self) {
        self.pos = self.start;
    }

    pub fn update(&mut self, _dt: f32) {}

    pub fn render(&self, surface: &mut dyn Surface, cache: &ResourceCache) {
        if let Some(sprite) = cache.sprite(sprites::PLAYER) {
            surface.draw_sprite(sprite, self.pos.x, self.pos.y);
        }
    }
}
