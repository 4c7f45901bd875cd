//! Spawn placement for food, enemies and power-ups
//!
//! Placement is rejection sampling with a fixed budget. Running out of attempts
//! is not an error: the caller simply spawns nothing this time.

use std::collections::HashSet;

use glam::IVec2;
use rand::Rng;

use super::entities::{Enemy, EntityId, EntityKind, Food, PowerUpItem};
use super::events::GameEvent;
use super::grid::GridPos;
use super::state::{GameSession, PowerUpKind};
use crate::economy::EconomyLedger;
use crate::tuning::Tuning;

/// Pick a uniformly random free cell in `[-span/2, span/2)` on both axes
pub fn valid_spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    span: u32,
    occupied: &HashSet<GridPos>,
    attempts: u32,
) -> Option<GridPos> {
    if span == 0 {
        return None;
    }
    let half = (span / 2) as i32;
    let span = span as i32;

    (0..attempts).find_map(|_| {
        let pos = IVec2::new(
            rng.random_range(0..span) - half,
            rng.random_range(0..span) - half,
        );
        (!occupied.contains(&pos)).then_some(pos)
    })
}

impl GameSession {
    fn free_cell(&mut self, tuning: &Tuning, reserved: Option<GridPos>) -> Option<GridPos> {
        let mut occupied = self.entities.occupied();
        occupied.extend(reserved);
        let span = tuning.grid_span(self.run.size_level);
        valid_spawn_position(&mut self.rng, span, &occupied, tuning.spawn_attempts)
    }

    /// Replace the food pellet with a new one somewhere free
    pub fn spawn_food(&mut self, tuning: &Tuning) -> Option<EntityId> {
        self.despawn_food();

        let Some(pos) = self.free_cell(tuning, None) else {
            log::debug!("No free cell for food");
            return None;
        };
        let id = self.entities.next_entity_id();
        self.entities.food = Some(Food {
            id,
            pos,
            drift: pos.as_vec2(),
        });
        self.emit(GameEvent::EntitySpawned {
            id,
            kind: EntityKind::Food,
            pos,
        });
        Some(id)
    }

    pub fn despawn_food(&mut self) -> Option<Food> {
        let food = self.entities.food.take()?;
        self.emit(GameEvent::EntityRemoved {
            id: food.id,
            kind: EntityKind::Food,
            pos: food.pos,
        });
        Some(food)
    }

    /// Add one enemy of a kind allowed at the current size level.
    /// `reserved` is kept clear (the cell the head is about to enter).
    pub fn spawn_enemy(&mut self, tuning: &Tuning, reserved: Option<GridPos>) -> Option<EntityId> {
        if self.entities.enemies.len() >= tuning.max_enemies {
            return None;
        }
        let kinds = tuning.spawnable_enemy_kinds(self.run.size_level);
        if kinds.is_empty() {
            return None;
        }
        let kind = kinds[self.rng.random_range(0..kinds.len())];

        let Some(pos) = self.free_cell(tuning, reserved) else {
            log::debug!("No free cell for enemy");
            return None;
        };
        let id = self.entities.next_entity_id();
        let health = tuning.enemy_kind(kind).map_or(1, |k| k.health);
        self.entities.enemies.push(Enemy {
            id,
            kind,
            pos,
            health,
        });
        self.emit(GameEvent::EntitySpawned {
            id,
            kind: EntityKind::Enemy(kind),
            pos,
        });
        Some(id)
    }

    pub fn remove_enemy(&mut self, index: usize) -> Enemy {
        let enemy = self.entities.enemies.remove(index);
        self.emit(GameEvent::EntityRemoved {
            id: enemy.id,
            kind: EntityKind::Enemy(enemy.kind),
            pos: enemy.pos,
        });
        enemy
    }

    /// Roll for a power-up drop; only one may be on the field at a time
    pub fn try_spawn_power_up(
        &mut self,
        tuning: &Tuning,
        ledger: &EconomyLedger,
    ) -> Option<EntityId> {
        if !self.entities.power_ups.is_empty() {
            return None;
        }
        if self.rng.random::<f64>() > ledger.power_up_chance() {
            return None;
        }

        let pos = self.free_cell(tuning, None)?;
        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        let id = self.entities.next_entity_id();
        self.entities.power_ups.push(PowerUpItem { id, kind, pos });
        self.emit(GameEvent::EntitySpawned {
            id,
            kind: EntityKind::PowerUp(kind),
            pos,
        });
        log::debug!("{} spawned at ({}, {})", kind.label(), pos.x, pos.y);
        Some(id)
    }

    pub fn remove_power_up(&mut self, index: usize) -> PowerUpItem {
        let item = self.entities.power_ups.remove(index);
        self.emit(GameEvent::EntityRemoved {
            id: item.id,
            kind: EntityKind::PowerUp(item.kind),
            pos: item.pos,
        });
        item
    }
}
