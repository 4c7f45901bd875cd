//! Entity registry: snake segments, food, enemies and power-up items
//!
//! Plain data keyed by [`EntityId`]. Nothing here knows how entities are drawn;
//! renderers follow along through [`GameEvent`](super::GameEvent)s.

use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::grid::GridPos;
use super::state::PowerUpKind;
use crate::tuning::EnemyKindId;

/// Stable handle for one entity within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// What an entity is, as reported to observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    SnakeHead,
    SnakeBody,
    Food,
    Enemy(EnemyKindId),
    PowerUp(PowerUpKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: EntityId,
    pub pos: GridPos,
}

/// Snake body, head first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snake {
    segments: VecDeque<Segment>,
}

impl Snake {
    pub fn head(&self) -> Option<&Segment> {
        self.segments.front()
    }

    pub fn tail(&self) -> Option<&Segment> {
        self.segments.back()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Segment role by index: only index 0 is the head
    pub fn kind_of(&self, index: usize) -> EntityKind {
        if index == 0 {
            EntityKind::SnakeHead
        } else {
            EntityKind::SnakeBody
        }
    }

    /// True if any segment behind the head sits on `pos`
    pub fn body_contains(&self, pos: GridPos) -> bool {
        self.segments.iter().skip(1).any(|s| s.pos == pos)
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        self.segments.iter().any(|s| s.pos == pos)
    }

    pub fn push_head(&mut self, segment: Segment) {
        self.segments.push_front(segment);
    }

    /// Append behind the current tail (used when building a fresh snake)
    pub fn push_tail(&mut self, segment: Segment) {
        self.segments.push_back(segment);
    }

    pub fn pop_tail(&mut self) -> Option<Segment> {
        self.segments.pop_back()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

/// The single food pellet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: EntityId,
    pub pos: GridPos,
    /// Continuous position the food magnet drags toward the head
    pub drift: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKindId,
    pub pos: GridPos,
    pub health: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpItem {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub pos: GridPos,
}

/// Every live entity of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRegistry {
    pub snake: Snake,
    pub food: Option<Food>,
    /// Ordered by spawn; collision scans take the first match
    pub enemies: Vec<Enemy>,
    pub power_ups: Vec<PowerUpItem>,
    next_id: u32,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            snake: Snake::default(),
            food: None,
            enemies: Vec::new(),
            power_ups: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Drop every entity; IDs keep counting so stale handles never alias
    pub fn clear(&mut self) {
        self.snake.clear();
        self.food = None;
        self.enemies.clear();
        self.power_ups.clear();
    }

    /// Cells taken by any entity
    pub fn occupied(&self) -> HashSet<GridPos> {
        let mut cells: HashSet<GridPos> = self.snake.iter().map(|s| s.pos).collect();
        cells.extend(self.food.iter().map(|f| f.pos));
        cells.extend(self.enemies.iter().map(|e| e.pos));
        cells.extend(self.power_ups.iter().map(|p| p.pos));
        cells
    }

    pub fn enemy_index_at(&self, pos: GridPos) -> Option<usize> {
        self.enemies.iter().position(|e| e.pos == pos)
    }

    pub fn power_up_index_at(&self, pos: GridPos) -> Option<usize> {
        self.power_ups.iter().position(|p| p.pos == pos)
    }

    /// Whatever occupies a cell, snake first
    pub fn entity_at(&self, pos: GridPos) -> Option<(EntityId, EntityKind)> {
        if let Some((i, seg)) = self.snake.iter().enumerate().find(|(_, s)| s.pos == pos) {
            return Some((seg.id, self.snake.kind_of(i)));
        }
        if let Some(food) = self.food.as_ref().filter(|f| f.pos == pos) {
            return Some((food.id, EntityKind::Food));
        }
        if let Some(enemy) = self.enemies.iter().find(|e| e.pos == pos) {
            return Some((enemy.id, EntityKind::Enemy(enemy.kind)));
        }
        self.power_ups
            .iter()
            .find(|p| p.pos == pos)
            .map(|p| (p.id, EntityKind::PowerUp(p.kind)))
    }
}
