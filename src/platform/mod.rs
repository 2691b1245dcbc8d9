//! Platform abstraction layer
//!
//! Handles host differences for:
//! - Frame timing (one callback per display frame)
//! - Directional input events

pub mod input;
pub mod time;

pub use input::{Direction, InputQueue, InputSender, input_channel};
pub use time::{FixedRateScheduler, FrameStats, ManualScheduler, Scheduler};
