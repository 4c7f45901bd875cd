//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Discrete ticks only; the frame loop lives in the session
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod entities;
pub mod events;
pub mod grid;
pub mod powerup;
pub mod spawn;
pub mod state;
pub mod tick;

pub use entities::{Enemy, EntityId, EntityKind, EntityRegistry, Food, PowerUpItem, Segment, Snake};
pub use events::{EssenceSource, GameEvent, Hazard, RunStats};
pub use grid::{Direction, GridPos, in_bounds};
pub use spawn::valid_spawn_position;
pub use state::{ActivePowerUp, GamePhase, GameSession, PowerUpKind, RunState};
pub use tick::{SELF_REASON, TickOutcome, WALL_REASON, check_size_level_up, tick};
