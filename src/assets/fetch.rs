//! Sprite fetchers

use std::path::PathBuf;

use image::{Rgba, RgbaImage};

use super::Sprite;
use crate::error::LoadError;
use crate::sprites;

/// Produces a decoded sprite for an identifier; called off the main thread
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, id: &str) -> Result<Sprite, LoadError>;
}

/// Decodes PNG files from a directory
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageFetcher for DirFetcher {
    fn fetch(&self, id: &str) -> Result<Sprite, LoadError> {
        let path = self.root.join(id);
        let bytes = std::fs::read(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let image = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
            id: id.to_string(),
            source,
        })?;
        Ok(Sprite::new(id, image.to_rgba8()))
    }
}

/// Solid-colour stand-ins for the game's sprites
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderFetcher;

impl PlaceholderFetcher {
    /// Size and colour for a known sprite
    fn style(id: &str) -> Option<(u32, u32, [u8; 4])> {
        match id {
            sprites::WATER => Some((101, 83, [40, 90, 200, 255])),
            sprites::STONE => Some((101, 83, [128, 128, 128, 255])),
            sprites::GRASS => Some((101, 83, [60, 170, 60, 255])),
            sprites::ENEMY => Some((90, 60, [200, 40, 40, 255])),
            sprites::PLAYER => Some((60, 70, [240, 220, 60, 255])),
            _ => None,
        }
    }
}

impl ImageFetcher for PlaceholderFetcher {
    fn fetch(&self, id: &str) -> Result<Sprite, LoadError> {
        let (width, height, color) =
            Self::style(id).ok_or_else(|| LoadError::Unknown(id.to_string()))?;
        Ok(Sprite::new(id, RgbaImage::from_pixel(width, height, Rgba(color))))
    }
}
