//! Rendering module
//!
//! Entities draw through the `Surface` trait. The game ships a software
//! frame buffer and a recording surface; a windowed host plugs in its own.

pub mod framebuffer;
pub mod surface;

pub use framebuffer::FrameBuffer;
pub use surface::{DrawCall, RecordingSurface, Surface};
