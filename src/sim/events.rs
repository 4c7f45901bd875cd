//! Events the simulation reports to renderers, audio and UI

use serde::{Deserialize, Serialize};

use super::entities::{EntityId, EntityKind};
use super::grid::GridPos;
use super::state::PowerUpKind;
use crate::economy::UpgradeKey;
use crate::tuning::EnemyKindId;

/// Collision a shield can absorb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hazard {
    Wall,
    OwnBody,
}

/// Where a batch of essence came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EssenceSource {
    Food,
    Enemy(EnemyKindId),
}

/// End-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub run_essence: u64,
    pub size_level: u32,
    pub highest_size_level: u32,
    pub snake_length: u32,
    pub ticks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A fresh run began at size level 0
    RunStarted {
        seed: u64,
        grid_radius: f32,
    },
    EntitySpawned {
        id: EntityId,
        kind: EntityKind,
        pos: GridPos,
    },
    EntityRemoved {
        id: EntityId,
        kind: EntityKind,
        pos: GridPos,
    },
    EntityMoved {
        id: EntityId,
        kind: EntityKind,
        from: GridPos,
        to: GridPos,
    },
    /// The previous head is now the first body segment
    SegmentBecameBody {
        id: EntityId,
        pos: GridPos,
    },
    EssenceGained {
        amount: u64,
        source: EssenceSource,
    },
    /// Viewport should rescale to `grid_radius`
    SizeLevelChanged {
        old: u32,
        new: u32,
        grid_radius: f32,
    },
    PowerUpActivated {
        kind: PowerUpKind,
        duration: f64,
    },
    PowerUpDeactivated {
        kind: PowerUpKind,
    },
    ShieldAbsorbed {
        hazard: Hazard,
    },
    Paused,
    Resumed,
    RunEnded {
        reason: String,
        stats: RunStats,
    },
    PurchaseResolved {
        key: UpgradeKey,
        accepted: bool,
    },
    PrestigeResolved {
        accepted: bool,
        prestige_points: u64,
    },
}
