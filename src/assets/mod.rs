//! Sprite loading
//!
//! Sprites are fetched on background threads and handed back to the
//! `ResourceCache`, which owns every slot and reports readiness once all
//! requested sprites have arrived.

pub mod cache;
pub mod fetch;

pub use cache::{Resource, ResourceCache};
pub use fetch::{DirFetcher, ImageFetcher, PlaceholderFetcher};

use std::sync::Arc;

use image::RgbaImage;

/// A decoded sprite
#[derive(Debug, Clone)]
pub struct Sprite {
    pub id: String,
    pub image: RgbaImage,
}

impl Sprite {
    pub fn new(id: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            id: id.into(),
            image,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Shared handle to a cached sprite; stable for the life of the cache
pub type SpriteHandle = Arc<Sprite>;
