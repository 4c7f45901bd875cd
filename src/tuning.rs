//! Data-driven game balance
//!
//! Every constant and static catalog the simulation reads lives in [`Tuning`].
//! Defaults reproduce the shipped balance; a JSON document may override any
//! subset of fields.

use std::collections::BTreeMap;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::economy::{UpgradeDef, UpgradeKey, default_upgrade_catalog};
use crate::sim::GridPos;

/// Index into [`Tuning::enemy_kinds`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyKindId(pub usize);

/// One row of the enemy catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyKind {
    pub key: String,
    pub label: String,
    /// Essence awarded on defeat, before multipliers
    pub essence: u64,
    /// Snake size level needed to defeat it
    pub size_requirement: u32,
    /// World size level at which it starts spawning
    pub min_spawn_size_level: u32,
    /// Kills an undersized snake on contact
    pub hostile: bool,
    pub health: u32,
    /// Collected on contact regardless of size requirement
    #[serde(default)]
    pub always_edible: bool,
}

/// Configuration problems found while loading or validating tuning
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{0} table is empty")]
    EmptyTable(&'static str),
    #[error("milestone table has {milestones} entries but zoom table has {zoom}")]
    MisalignedTables { milestones: usize, zoom: usize },
    #[error("upgrade catalog is missing `{0}`")]
    MissingUpgrade(&'static str),
    #[error("{0} must be positive")]
    NonPositive(&'static str),
}

/// Game balance and static catalogs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tuning {
    /// Tiles visible across the viewport at size level 0
    pub base_grid_size_visible: u32,
    /// Length needed to leave each size level
    pub length_milestones: Vec<u32>,
    /// Playfield scale per size level (index-aligned with milestones)
    pub zoom_factors: Vec<f32>,
    pub enemy_kinds: Vec<EnemyKind>,
    pub max_enemies: usize,
    pub initial_enemies: usize,
    pub initial_snake_segments: usize,
    /// Head cell of a fresh snake; the body trails to the left
    pub start_head: GridPos,
    pub food_essence: u64,
    pub spawn_attempts: u32,
    pub speed_boost_divisor: f64,
    pub essence_rush_multiplier: f64,
    /// Tiles per second
    pub food_magnet_speed: f32,
    pub starting_shield_duration_factor: f64,
    pub max_frame_dt: f64,
    pub prestige_base_cost: u64,
    pub prestige_cost_growth: f64,
    pub upgrades: BTreeMap<UpgradeKey, UpgradeDef>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_grid_size_visible: BASE_GRID_SIZE_VISIBLE,
            length_milestones: LENGTH_MILESTONES.to_vec(),
            zoom_factors: CAMERA_ZOOM_FACTORS.to_vec(),
            enemy_kinds: default_enemy_kinds(),
            max_enemies: MAX_ENEMIES_ON_SCREEN,
            initial_enemies: INITIAL_ENEMIES,
            initial_snake_segments: INITIAL_SNAKE_SEGMENTS,
            start_head: IVec2::new(-3, 0),
            food_essence: FOOD_ESSENCE,
            spawn_attempts: SPAWN_ATTEMPTS,
            speed_boost_divisor: SPEED_BOOST_DIVISOR,
            essence_rush_multiplier: ESSENCE_RUSH_MULTIPLIER,
            food_magnet_speed: FOOD_MAGNET_SPEED,
            starting_shield_duration_factor: STARTING_SHIELD_DURATION_FACTOR,
            max_frame_dt: MAX_FRAME_DT,
            prestige_base_cost: PRESTIGE_BASE_COST,
            prestige_cost_growth: PRESTIGE_COST_GROWTH,
            upgrades: default_upgrade_catalog(LENGTH_MILESTONES.len() as u32 - 1),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.length_milestones.is_empty() {
            return Err(TuningError::EmptyTable("milestone"));
        }
        if self.zoom_factors.len() != self.length_milestones.len() {
            return Err(TuningError::MisalignedTables {
                milestones: self.length_milestones.len(),
                zoom: self.zoom_factors.len(),
            });
        }
        if self.enemy_kinds.is_empty() {
            return Err(TuningError::EmptyTable("enemy kind"));
        }
        if self.base_grid_size_visible == 0 {
            return Err(TuningError::NonPositive("baseGridSizeVisible"));
        }
        if self.speed_boost_divisor <= 0.0 {
            return Err(TuningError::NonPositive("speedBoostDivisor"));
        }
        if self.max_frame_dt <= 0.0 {
            return Err(TuningError::NonPositive("maxFrameDt"));
        }
        if let Some(key) = UpgradeKey::ALL.iter().find(|k| !self.upgrades.contains_key(*k)) {
            return Err(TuningError::MissingUpgrade(key.as_str()));
        }
        Ok(())
    }

    /// Zoom factor for a size level (levels past the table reuse the last entry)
    pub fn zoom_factor(&self, size_level: u32) -> f32 {
        let last = self.zoom_factors.len().saturating_sub(1);
        self.zoom_factors
            .get((size_level as usize).min(last))
            .copied()
            .unwrap_or(1.0)
    }

    /// Playable span in whole tiles for a size level
    pub fn grid_span(&self, size_level: u32) -> u32 {
        (self.base_grid_size_visible as f32 * self.zoom_factor(size_level)).round() as u32
    }

    /// Half-extent of the playfield; valid cells lie in `[-radius, radius)`
    pub fn grid_radius(&self, size_level: u32) -> f32 {
        self.grid_span(size_level) as f32 / 2.0
    }

    /// Length needed to leave `size_level`, if the table goes that far
    pub fn milestone(&self, size_level: u32) -> Option<u32> {
        self.length_milestones.get(size_level as usize).copied()
    }

    pub fn enemy_kind(&self, id: EnemyKindId) -> Option<&EnemyKind> {
        self.enemy_kinds.get(id.0)
    }

    /// Enemy kinds allowed to spawn at a world size level
    pub fn spawnable_enemy_kinds(&self, size_level: u32) -> Vec<EnemyKindId> {
        self.enemy_kinds
            .iter()
            .enumerate()
            .filter(|(_, kind)| kind.min_spawn_size_level <= size_level)
            .map(|(i, _)| EnemyKindId(i))
            .collect()
    }

    /// Catalog entry for an upgrade, falling back to the built-in definition
    pub fn upgrade_def(&self, key: UpgradeKey) -> UpgradeDef {
        match self.upgrades.get(&key) {
            Some(def) => def.clone(),
            None => {
                let max_size_level = self.length_milestones.len().saturating_sub(1) as u32;
                UpgradeDef::builtin(key, max_size_level)
            }
        }
    }
}

/// The shipped enemy catalog
pub fn default_enemy_kinds() -> Vec<EnemyKind> {
    let kind = |key: &str, label: &str, essence, size_requirement, min_spawn, hostile, health| {
        EnemyKind {
            key: key.to_string(),
            label: label.to_string(),
            essence,
            size_requirement,
            min_spawn_size_level: min_spawn,
            hostile,
            health,
            always_edible: false,
        }
    };

    let mut pellet = kind("PELLET", "Energy Pellet", 1, 0, 0, false, 1);
    pellet.always_edible = true;

    vec![
        pellet,
        kind("GRUNT", "Space Mite", 5, 0, 0, true, 1),
        kind("GUARD", "Void Sentinel", 15, 1, 1, true, 2),
        kind("TITAN", "Cosmic Behemoth", 50, 3, 2, true, 5),
        kind("GOLIATH", "Cosmic Goliath", 100, 4, 3, true, 6),
    ]
}
