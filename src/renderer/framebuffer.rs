//! Software frame buffer
//!
//! Sprites are alpha-blended into an RGBA image; handy for headless runs and
//! for checking a frame by eye.

use std::path::Path;

use image::{Rgba, RgbaImage, imageops};

use super::surface::Surface;
use crate::assets::Sprite;

/// Background colour after a clear
const CLEAR_COLOR: Rgba<u8> = Rgba([0, 0, 0, 0]);

#[derive(Debug, Clone)]
pub struct FrameBuffer {
    image: RgbaImage,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, CLEAR_COLOR),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Write the current frame as a PNG
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.image.save(path)
    }
}

impl Surface for FrameBuffer {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = CLEAR_COLOR;
        }
    }

    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32) {
        // Off-canvas parts are clipped
        imageops::overlay(&mut self.image, &sprite.image, x.round() as i64, y.round() as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red(w: u32, h: u32) -> Sprite {
        Sprite::new("red.png", RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn test_draw_and_clear() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_sprite(&red(2, 2), 3.0, 4.0);
        assert_eq!(fb.image().get_pixel(3, 4), &Rgba([255, 0, 0, 255]));
        assert_eq!(fb.image().get_pixel(5, 4), &CLEAR_COLOR);

        fb.clear();
        assert_eq!(fb.image().get_pixel(3, 4), &CLEAR_COLOR);
    }

    #[test]
    fn test_partially_off_screen_is_clipped() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.draw_sprite(&red(4, 4), -2.0, 8.0);
        assert_eq!(fb.image().get_pixel(0, 8), &Rgba([255, 0, 0, 255]));
        assert_eq!(fb.image().get_pixel(2, 8), &CLEAR_COLOR);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let fb = FrameBuffer::new(4, 4);
        fb.save_png(&path).unwrap();
        assert!(path.exists());
    }
}
