//! Directional input
//!
//! Key events arrive outside the frame loop (any thread). They are queued and
//! the engine applies them at the start of the next update.

use std::sync::mpsc::{Receiver, Sender, channel};

/// A one-cell movement request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Prefix stripped from raw key identifiers ("ArrowUp" -> "up")
    pub const KEY_PREFIX: &'static str = "Arrow";

    /// Parse a raw key identifier; unknown keys yield None
    pub fn from_key(key: &str) -> Option<Self> {
        let token = key.strip_prefix(Self::KEY_PREFIX).unwrap_or(key);
        match token.to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

/// Create a connected sender/queue pair
pub fn input_channel() -> (InputSender, InputQueue) {
    let (tx, rx) = channel();
    (InputSender { tx }, InputQueue { rx })
}

/// Producer side, cloneable into key handlers
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<Direction>,
}

impl InputSender {
    pub fn send(&self, direction: Direction) {
        if self.tx.send(direction).is_err() {
            log::debug!("Input dropped, engine is gone");
        }
    }

    /// Feed a raw key identifier; returns false if it was ignored
    pub fn send_key(&self, key: &str) -> bool {
        match Direction::from_key(key) {
            Some(direction) => {
                self.send(direction);
                true
            }
            None => {
                log::debug!("Ignoring key {:?}", key);
                false
            }
        }
    }
}

/// Consumer side, owned by the engine
#[derive(Debug)]
pub struct InputQueue {
    rx: Receiver<Direction>,
}

impl InputQueue {
    /// Take every move queued since the last call
    pub fn drain(&self) -> Vec<Direction> {
        self.rx.try_iter().collect()
    }
}
