//! Serpent Scale - A grid snake arcade game with a meta-progression economy
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (movement, collisions, growth, power-ups)
//! - `economy`: Essence and prestige upgrades, purchase and prestige transactions
//! - `session`: Run lifecycle, frame accumulator and input buffering
//! - `persistence`: Save/load of the economy snapshot with per-key merge
//! - `presentation`: Boundary the renderer and audio layer observe
//! - `platform`: Browser/native storage and the wasm binding
//! - `tuning`: Data-driven game balance and static catalogs

pub mod economy;
pub mod persistence;
pub mod platform;
pub mod presentation;
pub mod session;
pub mod sim;
pub mod tuning;

pub use economy::{Currency, EconomyLedger, PurchaseRejection, UpgradeKey};
pub use session::SessionController;
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Undrained events kept per session; older ones are dropped past this
    pub const MAX_PENDING_EVENTS: usize = 4096;

    /// Upper bound on one frame's elapsed time, avoids catch-up jumps after a stall
    pub const MAX_FRAME_DT: f64 = 0.1;

    /// Tiles visible across the viewport at size level 0
    pub const BASE_GRID_SIZE_VISIBLE: u32 = 20;

    /// Seconds between ticks before any move-speed upgrade
    pub const INITIAL_MOVE_INTERVAL: f64 = 0.20;
    /// Move interval can never drop below this
    pub const MOVE_INTERVAL_FLOOR: f64 = 0.05;

    /// Power-up duration (seconds) before any duration upgrade
    pub const POWERUP_DURATION: f64 = 7.0;

    /// Length needed to reach the next size level
    pub const LENGTH_MILESTONES: [u32; 10] = [5, 12, 22, 35, 55, 80, 110, 150, 200, 260];
    /// How much the playfield expands per size level (index-aligned with milestones)
    pub const CAMERA_ZOOM_FACTORS: [f32; 10] = [1.0, 1.3, 1.7, 2.2, 2.8, 3.5, 4.3, 5.2, 6.2, 7.5];

    /// Enemy population cap
    pub const MAX_ENEMIES_ON_SCREEN: usize = 8;
    /// Enemies spawned when a run starts
    pub const INITIAL_ENEMIES: usize = 2;
    /// Segments in a freshly built snake
    pub const INITIAL_SNAKE_SEGMENTS: usize = 3;

    /// Rejection-sampling budget for spawn placement
    pub const SPAWN_ATTEMPTS: u32 = 100;

    /// Essence from one food pellet before multipliers
    pub const FOOD_ESSENCE: u64 = 1;

    /// SPEED_BOOST divides the move interval by this
    pub const SPEED_BOOST_DIVISOR: f64 = 1.75;
    /// ESSENCE_RUSH multiplies food essence by this
    pub const ESSENCE_RUSH_MULTIPLIER: f64 = 2.5;
    /// FOOD_MAGNET pull speed (tiles/second)
    pub const FOOD_MAGNET_SPEED: f32 = 2.5;
    /// Starting shield lasts this many times the regular duration
    pub const STARTING_SHIELD_DURATION_FACTOR: f64 = 1.5;

    /// Essence needed for the first prestige
    pub const PRESTIGE_BASE_COST: u64 = 15_000;
    /// Prestige cost growth per prestige
    pub const PRESTIGE_COST_GROWTH: f64 = 2.5;
}
