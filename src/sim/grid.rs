//! Playfield layout
//!
//! All positions share one pixel coordinate space. The player moves in whole
//! cells; obstacles move continuously along fixed lanes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Immutable grid dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub columns: u32,
    pub rows: u32,
    pub cell_width: f32,
    pub cell_height: f32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            columns: COLUMNS,
            rows: ROWS,
            cell_width: CELL_WIDTH,
            cell_height: CELL_HEIGHT,
        }
    }
}

impl Grid {
    /// Right edge of the playfield
    pub fn max_x(&self) -> f32 {
        self.columns as f32 * self.cell_width
    }

    /// The fixed y offsets obstacles travel along
    pub fn lanes(&self) -> [f32; LANE_COUNT] {
        std::array::from_fn(|i| (i + 1) as f32 * self.cell_height - LANE_Y_OFFSET)
    }

    /// Where the player token starts (and returns to after a collision)
    pub fn player_start(&self) -> Vec2 {
        let row = self.rows.saturating_sub(2);
        Vec2::new(
            PLAYER_START_COLUMN as f32 * self.cell_width,
            row as f32 * self.cell_height - PLAYER_Y_OFFSET,
        )
    }

    /// Player rows whose y is below this win the game
    pub fn win_line(&self) -> f32 {
        self.cell_height / 2.0
    }

    /// Pixel size of the drawing surface
    pub fn surface_size(&self) -> (u32, u32) {
        let width = (self.columns as f32 * self.cell_width) as u32;
        let height = (self.rows as f32 * self.cell_width) as u32;
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let grid = Grid::default();
        assert_eq!(grid.max_x(), 505.0);
        assert_eq!(grid.lanes(), [63.0, 146.0, 229.0]);
        assert_eq!(grid.player_start(), Vec2::new(202.0, 322.0));
        assert_eq!(grid.win_line(), 41.5);
        assert_eq!(grid.surface_size(), (505, 606));
    }
}
