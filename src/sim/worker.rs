//! Collision detection on a background thread
//!
//! The main loop sends one `Snapshot` per frame and never waits for the
//! answer. The worker replies with an explicit verdict per snapshot; the
//! loop drains whatever replies have arrived on the next frame, so a hit is
//! reported with at most one frame of latency.

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::{self, JoinHandle};
#[cfg(test)]
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{CollisionDetector, Snapshot, Verdict};
use crate::error::ProtocolError;

/// A verdict tagged with the session it was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    pub generation: u64,
    pub verdict: Verdict,
}

/// Player coordinate in a wire message
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: f32,
    pub y: f32,
}

/// Inbound worker message in its JSON form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    #[serde(rename = "obstaclePositions", alias = "enemiesPosition", default)]
    pub obstacle_positions: Vec<f32>,
    pub player: WirePoint,
}

impl WireRequest {
    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_snapshot(self) -> Result<Snapshot, ProtocolError> {
        if self.obstacle_positions.len() % 2 != 0 {
            return Err(ProtocolError::OddLength(self.obstacle_positions.len()));
        }
        Ok(Snapshot {
            generation: 0,
            obstacles: self.obstacle_positions,
            player: Vec2::new(self.player.x, self.player.y),
        })
    }
}

/// Answer one JSON message the way the legacy worker did: `Some("lose")` or nothing
pub fn handle_wire_message(json: &str) -> Result<Option<&'static str>, ProtocolError> {
    let snapshot = WireRequest::from_json(json)?.into_snapshot()?;
    Ok(snapshot.evaluate()?.to_wire())
}

/// Collision detector running on its own thread
pub struct OffloadedDetector {
    requests: Option<Sender<Snapshot>>,
    replies: Receiver<Reply>,
    handle: Option<JoinHandle<()>>,
    disconnected: bool,
}

impl OffloadedDetector {
    /// Start the worker thread
    pub fn spawn() -> std::io::Result<Self> {
        let (request_tx, request_rx) = channel::<Snapshot>();
        let (reply_tx, reply_rx) = channel::<Reply>();

        let handle = thread::Builder::new()
            .name("collision-worker".into())
            .spawn(move || worker_loop(request_rx, reply_tx))?;

        log::info!("Collision worker started");
        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            handle: Some(handle),
            disconnected: false,
        })
    }

    /// Post a snapshot without waiting; false if the worker is gone
    pub fn submit(&mut self, snapshot: Snapshot) -> bool {
        let sent = self
            .requests
            .as_ref()
            .is_some_and(|tx| tx.send(snapshot).is_ok());
        if !sent && !self.disconnected {
            log::error!("Collision worker is gone; collisions will not be detected");
            self.disconnected = true;
        }
        sent
    }

    /// Take every reply that has arrived so far
    pub fn drain(&mut self) -> Vec<Reply> {
        let mut replies = Vec::new();
        loop {
            match self.replies.try_recv() {
                Ok(reply) => replies.push(reply),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.disconnected {
                        log::error!("Collision worker reply channel closed");
                        self.disconnected = true;
                    }
                    break;
                }
            }
        }
        replies
    }

    /// Block up to `timeout` for the next reply
    #[cfg(test)]
    fn recv_timeout(&self, timeout: Duration) -> Option<Reply> {
        self.replies.recv_timeout(timeout).ok()
    }
}

impl CollisionDetector for OffloadedDetector {
    fn detect(&mut self, snapshot: Snapshot) -> bool {
        let generation = snapshot.generation;
        self.submit(snapshot);
        touching_for(&self.drain(), generation)
    }
}

impl Drop for OffloadedDetector {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Collision worker panicked");
            }
        }
    }
}

/// Whether any reply for `generation` reports a touch
fn touching_for(replies: &[Reply], generation: u64) -> bool {
    let mut touching = false;
    for reply in replies {
        if reply.generation != generation {
            log::debug!("Dropping verdict from session {}", reply.generation);
            continue;
        }
        touching |= reply.verdict.is_touching();
    }
    touching
}

fn worker_loop(requests: Receiver<Snapshot>, replies: Sender<Reply>) {
    for snapshot in requests {
        let verdict = match snapshot.evaluate() {
            Ok(verdict) => verdict,
            Err(e) => {
                log::warn!("Collision worker rejected snapshot: {}", e);
                continue;
            }
        };
        let reply = Reply {
            generation: snapshot.generation,
            verdict,
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
    log::debug!("Collision worker stopped");
}
