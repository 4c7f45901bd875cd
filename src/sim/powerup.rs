//! Timed power-up effects
//!
//! Only one effect runs at a time. Activating a new one first reverses the
//! old one, so a SPEED_BOOST never outlives its timer.

use super::entities::EntityKind;
use super::events::GameEvent;
use super::state::{ActivePowerUp, GameSession, PowerUpKind};
use crate::economy::EconomyLedger;
use crate::tuning::Tuning;

impl GameSession {
    pub fn activate_power_up(
        &mut self,
        kind: PowerUpKind,
        duration: f64,
        tuning: &Tuning,
        ledger: &EconomyLedger,
    ) {
        if self.run.active_power_up.is_some() {
            self.deactivate_power_up(ledger);
        }

        if kind == PowerUpKind::SpeedBoost {
            self.run.move_interval /= tuning.speed_boost_divisor;
        }
        if kind == PowerUpKind::FoodMagnet {
            // Start pulling from wherever the pellet currently sits
            if let Some(food) = self.entities.food.as_mut() {
                food.drift = food.pos.as_vec2();
            }
        }

        self.run.active_power_up = Some(ActivePowerUp {
            kind,
            time_left: duration,
        });
        self.emit(GameEvent::PowerUpActivated { kind, duration });
        log::info!("{} activated for {:.1}s", kind.label(), duration);
    }

    /// End the running effect and undo its side effects
    pub fn deactivate_power_up(&mut self, ledger: &EconomyLedger) {
        let Some(active) = self.run.active_power_up.take() else {
            return;
        };
        if active.kind == PowerUpKind::SpeedBoost {
            self.run.move_interval = ledger.move_interval();
        }
        self.emit(GameEvent::PowerUpDeactivated { kind: active.kind });
        log::debug!("{} expired", active.kind.label());
    }

    /// Per-frame timer and continuous effects
    pub fn update_power_up(&mut self, dt: f64, tuning: &Tuning, ledger: &EconomyLedger) {
        let Some(active) = self.run.active_power_up.as_mut() else {
            return;
        };
        active.time_left -= dt;
        let kind = active.kind;

        if active.time_left <= 0.0 {
            self.deactivate_power_up(ledger);
        } else if kind == PowerUpKind::FoodMagnet {
            self.pull_food(dt as f32, tuning);
        }
    }

    /// Drag the food toward the head, hopping cells when the way is clear
    fn pull_food(&mut self, dt: f32, tuning: &Tuning) {
        let Some(head) = self.entities.snake.head().map(|s| s.pos) else {
            return;
        };
        let Some(food) = self.entities.food.as_mut() else {
            return;
        };

        let target = head.as_vec2();
        let to_head = target - food.drift;
        let dist = to_head.length();
        if dist <= f32::EPSILON {
            return;
        }
        let step = tuning.food_magnet_speed * dt;
        food.drift = if step >= dist {
            target
        } else {
            food.drift + to_head / dist * step
        };

        let (id, from) = (food.id, food.pos);
        let to = food.drift.round().as_ivec2();
        if to == from {
            return;
        }
        let reg = &self.entities;
        if reg.snake.contains(to)
            || reg.enemy_index_at(to).is_some()
            || reg.power_up_index_at(to).is_some()
        {
            return;
        }

        if let Some(food) = self.entities.food.as_mut() {
            food.pos = to;
        }
        self.emit(GameEvent::EntityMoved {
            id,
            kind: EntityKind::Food,
            from,
            to,
        });
    }
}
