//! Frame scheduling
//!
//! The loop runs one tick per frame on a single thread. `next_frame` is the
//! only place it suspends, so ticks never overlap.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Source of frame callbacks
pub trait Scheduler {
    /// Wait for the next frame and return its timestamp in milliseconds
    ///
    /// Returns None once the host tears the loop down.
    fn next_frame(&mut self) -> Option<f64>;
}

/// Native scheduler that sleeps to a target frame rate
#[derive(Debug)]
pub struct FixedRateScheduler {
    origin: Instant,
    interval: Duration,
    next_deadline: Instant,
    max_frames: Option<u64>,
    frames: u64,
}

impl FixedRateScheduler {
    pub fn new(interval: Duration, max_frames: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            origin: now,
            interval,
            next_deadline: now,
            max_frames,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Scheduler for FixedRateScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        if self.max_frames.is_some_and(|max| self.frames >= max) {
            return None;
        }

        let now = Instant::now();
        if now < self.next_deadline {
            std::thread::sleep(self.next_deadline - now);
        }
        // Late frames do not try to catch up
        self.next_deadline = Instant::now().max(self.next_deadline) + self.interval;
        self.frames += 1;

        Some(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Replays a fixed list of timestamps (tests, recorded runs)
#[derive(Debug, Default)]
pub struct ManualScheduler {
    timestamps: VecDeque<f64>,
}

impl ManualScheduler {
    pub fn new(timestamps: impl IntoIterator<Item = f64>) -> Self {
        Self {
            timestamps: timestamps.into_iter().collect(),
        }
    }

    /// `count` frames spaced `interval_ms` apart, starting at `start_ms`
    pub fn evenly_spaced(start_ms: f64, interval_ms: f64, count: usize) -> Self {
        Self::new((0..count).map(|i| start_ms + i as f64 * interval_ms))
    }
}

impl Scheduler for ManualScheduler {
    fn next_frame(&mut self) -> Option<f64> {
        self.timestamps.pop_front()
    }
}

/// Rolling frame-rate estimate over the last 60 frames
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
        }
    }
}

impl FrameStats {
    /// Record a frame timestamp (ms)
    pub fn record(&mut self, time: f64) {
        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % 60;

        // Oldest slot is the one we write next
        let oldest_time = self.frame_times[self.frame_index];
        if oldest_time > 0.0 {
            let elapsed = time - oldest_time;
            if elapsed > 0.0 {
                self.fps = (59_000.0 / elapsed).round() as u32;
            }
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}
