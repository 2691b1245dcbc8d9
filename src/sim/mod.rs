//! Simulation module
//!
//! Entity model and collision detection. No rendering or platform
//! dependencies beyond the `Surface` handle entities draw through.
//! - Seeded RNG only
//! - Positions in one pixel coordinate space

pub mod collision;
pub mod grid;
pub mod obstacle;
pub mod player;
pub mod state;
pub mod tick;
pub mod worker;

pub use collision::{CollisionDetector, Snapshot, SyncDetector, Verdict, any_touching, touches};
pub use grid::Grid;
pub use obstacle::Obstacle;
pub use player::{MoveOutcome, Player, Range};
pub use state::{EventBus, GameSignal, Session};
pub use tick::update;
pub use worker::{OffloadedDetector, Reply, WireRequest, handle_wire_message};
