//! One update step over a session
//!
//! Applies queued moves, advances obstacles by `dt` and runs collision
//! detection. Signals go to the event bus; the engine reacts to them.

use super::collision::CollisionDetector;
use super::player::MoveOutcome;
use super::state::{EventBus, GameSignal, Session};
use crate::platform::Direction;

/// Advance the session by `dt` seconds
pub fn update(
    session: &mut Session,
    moves: &[Direction],
    dt: f32,
    detector: &mut dyn CollisionDetector,
    events: &mut EventBus,
) {
    for &direction in moves {
        if session.player.move_toward(direction) == MoveOutcome::Won {
            events.push(GameSignal::Win);
        }
    }

    let dt = dt.max(0.0);
    for obstacle in &mut session.obstacles {
        obstacle.update(dt);
    }
    session.player.update(dt);

    if detector.detect(session.snapshot()) {
        events.push(GameSignal::Lose);
    }
}
