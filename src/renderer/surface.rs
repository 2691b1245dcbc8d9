//! Drawing surface contract

use crate::assets::Sprite;

/// Anything sprites can be drawn onto
pub trait Surface {
    /// Size in pixels
    fn size(&self) -> (u32, u32);

    /// Clear the whole surface
    fn clear(&mut self);

    /// Draw a sprite with its top-left corner at (x, y)
    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32);
}

/// One recorded draw
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub sprite: String,
    pub x: f32,
    pub y: f32,
}

/// Surface that remembers what was drawn since the last clear
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    pub calls: Vec<DrawCall>,
    pub clears: u32,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
            clears: 0,
        }
    }

    /// Draws of one sprite since the last clear
    pub fn calls_for<'a>(&'a self, sprite: &'a str) -> impl Iterator<Item = &'a DrawCall> + 'a {
        self.calls.iter().filter(move |c| c.sprite == sprite)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.calls.clear();
        self.clears += 1;
    }

    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32) {
        self.calls.push(DrawCall {
            sprite: sprite.id.clone(),
            x,
            y,
        });
    }
}
