//! Discrete simulation tick
//!
//! One call moves the snake one cell and resolves everything that happens on
//! the cell it enters. The frame loop in [`SessionController`] decides when a
//! tick is due.
//!
//! [`SessionController`]: crate::session::SessionController

use super::entities::{EntityKind, Segment};
use super::events::{EssenceSource, GameEvent, Hazard};
use super::grid::{GridPos, in_bounds};
use super::state::{GamePhase, GameSession, PowerUpKind};
use crate::economy::EconomyLedger;
use crate::tuning::Tuning;

pub const WALL_REASON: &str = "Lost in the Void (hit a wall)!";
pub const SELF_REASON: &str = "Consumed by your own mass!";

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No move this frame (not running, or no tick due yet)
    Skipped,
    /// The snake entered a new cell
    Advanced,
    /// A shield ate the collision and the snake held position
    ShieldAbsorbed(Hazard),
    /// The run ended with this reason
    Ended(String),
}

/// Advance the run by one move
pub fn tick(session: &mut GameSession, tuning: &Tuning, ledger: &mut EconomyLedger) -> TickOutcome {
    if session.run.phase != GamePhase::Running {
        return TickOutcome::Skipped;
    }
    let Some(head) = session.entities.snake.head().copied() else {
        return TickOutcome::Skipped;
    };

    session.run.direction = session.run.next_direction;
    session.run.ticks += 1;
    let candidate = head.pos + session.run.direction.delta();

    // Walls, then own body
    if !in_bounds(candidate, session.grid_radius(tuning)) {
        return collide(session, Hazard::Wall, ledger);
    }
    if session.entities.snake.body_contains(candidate) {
        return collide(session, Hazard::OwnBody, ledger);
    }

    if let Some(reason) = resolve_enemy(session, candidate, tuning, ledger) {
        session.end_run(reason.clone(), ledger);
        return TickOutcome::Ended(reason);
    }

    // Commit the move
    let id = session.entities.next_entity_id();
    session.entities.snake.push_head(Segment { id, pos: candidate });
    session.emit(GameEvent::SegmentBecameBody {
        id: head.id,
        pos: head.pos,
    });
    session.emit(GameEvent::EntitySpawned {
        id,
        kind: EntityKind::SnakeHead,
        pos: candidate,
    });

    let ate_food = session
        .entities
        .food
        .as_ref()
        .is_some_and(|f| f.pos == candidate);
    if ate_food {
        eat_food(session, tuning, ledger);
    }

    if let Some(index) = session.entities.power_up_index_at(candidate) {
        let item = session.remove_power_up(index);
        session.activate_power_up(item.kind, ledger.power_up_duration(), tuning, ledger);
    }

    if !ate_food {
        if let Some(tail) = session.entities.snake.pop_tail() {
            session.emit(GameEvent::EntityRemoved {
                id: tail.id,
                kind: EntityKind::SnakeBody,
                pos: tail.pos,
            });
        }
    }

    log::debug!(
        "Tick {}: head ({}, {}), length {}",
        session.run.ticks,
        candidate.x,
        candidate.y,
        session.run.snake_length
    );
    TickOutcome::Advanced
}

/// Wall or self collision: spend the shield if there is one, otherwise lose
fn collide(session: &mut GameSession, hazard: Hazard, ledger: &mut EconomyLedger) -> TickOutcome {
    if session.run.shield_active() {
        session.deactivate_power_up(ledger);
        session.emit(GameEvent::ShieldAbsorbed { hazard });
        log::info!("Shield absorbed a {:?} collision", hazard);
        return TickOutcome::ShieldAbsorbed(hazard);
    }

    let reason = match hazard {
        Hazard::Wall => WALL_REASON,
        Hazard::OwnBody => SELF_REASON,
    };
    session.end_run(reason, ledger);
    TickOutcome::Ended(reason.to_string())
}

/// Handle an enemy on `cell`. Returns the loss reason when it kills the snake.
fn resolve_enemy(
    session: &mut GameSession,
    cell: GridPos,
    tuning: &Tuning,
    ledger: &mut EconomyLedger,
) -> Option<String> {
    let index = session.entities.enemy_index_at(cell)?;
    let kind_id = session.entities.enemies[index].kind;
    let kind = tuning.enemy_kind(kind_id)?;

    let defeatable = session.run.size_level >= kind.size_requirement;
    if defeatable || (!kind.hostile && kind.always_edible) {
        let essence = ledger.scaled_essence(kind.essence);
        session.remove_enemy(index);
        award_essence(session, essence, EssenceSource::Enemy(kind_id), ledger);
        session.spawn_enemy(tuning, Some(cell));
        None
    } else if kind.hostile {
        Some(format!("Defeated by a {}!", kind.label))
    } else {
        None
    }
}

fn eat_food(session: &mut GameSession, tuning: &Tuning, ledger: &mut EconomyLedger) {
    if session.despawn_food().is_none() {
        return;
    }
    // Multipliers are read at pickup, not at spawn
    let mut essence = ledger.scaled_essence(tuning.food_essence);
    if session.run.is_active(PowerUpKind::EssenceRush) {
        essence = (essence as f64 * tuning.essence_rush_multiplier).floor() as u64;
    }
    award_essence(session, essence, EssenceSource::Food, ledger);

    session.spawn_food(tuning);
    session.try_spawn_power_up(tuning, ledger);

    session.run.snake_length += 1;
    check_size_level_up(session, tuning, ledger);
}

fn award_essence(
    session: &mut GameSession,
    amount: u64,
    source: EssenceSource,
    ledger: &mut EconomyLedger,
) {
    session.run.run_essence += amount;
    ledger.credit_essence(amount);
    session.emit(GameEvent::EssenceGained { amount, source });
}

/// Climb at most one size level if the current length has earned it
pub fn check_size_level_up(
    session: &mut GameSession,
    tuning: &Tuning,
    ledger: &EconomyLedger,
) -> bool {
    let old = session.run.size_level;
    let Some(milestone) = tuning.milestone(old) else {
        return false;
    };
    if old >= ledger.max_size_level() || session.run.snake_length < milestone {
        return false;
    }

    let new = old + 1;
    session.run.size_level = new;
    session.run.highest_size_level = session.run.highest_size_level.max(new);
    let grid_radius = tuning.grid_radius(new);
    session.emit(GameEvent::SizeLevelChanged {
        old,
        new,
        grid_radius,
    });
    log::info!("Size level {} reached (grid radius {})", new, grid_radius);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::UpgradeKey;
    use crate::sim::entities::{Enemy, Food, PowerUpItem};
    use crate::sim::grid::Direction;
    use crate::tuning::EnemyKindId;
    use glam::{IVec2, Vec2};
    use proptest::prelude::*;

    /// A running session with only the snake on the field
    fn arena(tuning: &Tuning, ledger: &EconomyLedger) -> GameSession {
        let mut session = GameSession::new(ledger.move_interval());
        session.begin_run(11, tuning, ledger);
        session.entities.enemies.clear();
        session.entities.power_ups.clear();
        session.entities.food = None;
        session.drain_events();
        session
    }

    fn place_food(session: &mut GameSession, x: i32, y: i32) {
        let id = session.entities.next_entity_id();
        session.entities.food = Some(Food {
            id,
            pos: IVec2::new(x, y),
            drift: Vec2::new(x as f32, y as f32),
        });
    }

    fn place_enemy(session: &mut GameSession, kind: usize, x: i32, y: i32) {
        let id = session.entities.next_entity_id();
        session.entities.enemies.push(Enemy {
            id,
            kind: EnemyKindId(kind),
            pos: IVec2::new(x, y),
            health: 1,
        });
    }

    fn cells(session: &GameSession) -> Vec<IVec2> {
        session.entities.snake.iter().map(|s| s.pos).collect()
    }

    #[test]
    fn test_plain_move_retracts_tail() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);

        assert_eq!(tick(&mut session, &tuning, &mut ledger), TickOutcome::Advanced);
        assert_eq!(
            cells(&session),
            vec![IVec2::new(-2, 0), IVec2::new(-3, 0), IVec2::new(-4, 0)]
        );
        assert_eq!(session.run.snake_length, 3);

        let events = session.drain_events();
        assert!(matches!(events[0], GameEvent::SegmentBecameBody { .. }));
        assert!(matches!(
            events[1],
            GameEvent::EntitySpawned { kind: EntityKind::SnakeHead, .. }
        ));
        assert!(matches!(
            events[2],
            GameEvent::EntityRemoved { kind: EntityKind::SnakeBody, pos, .. } if pos == IVec2::new(-5, 0)
        ));
    }

    #[test]
    fn test_food_ahead_grows_snake() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        place_food(&mut session, -2, 0);

        tick(&mut session, &tuning, &mut ledger);

        assert_eq!(session.run.snake_length, 4);
        assert_eq!(session.entities.snake.len(), 4);
        assert_eq!(
            session.entities.snake.tail().map(|s| s.pos),
            Some(IVec2::new(-5, 0))
        );
        assert_eq!(session.run.run_essence, 1);
        assert_eq!(ledger.total_essence, 1);
        let food = session.entities.food.as_ref().unwrap();
        assert!(!session.entities.snake.contains(food.pos));
    }

    #[test]
    fn test_food_yield_uses_upgrades_bought_mid_run() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        place_food(&mut session, -2, 0);

        ledger.total_essence = 1_000_000;
        for _ in 0..6 {
            ledger.purchase(UpgradeKey::EssenceGain).unwrap();
        }
        let banked = ledger.total_essence;
        assert!(ledger.essence_multiplier() > 2.0);

        tick(&mut session, &tuning, &mut ledger);
        assert_eq!(session.run.run_essence, 2);
        assert_eq!(ledger.total_essence, banked + 2);
    }

    #[test]
    fn test_essence_rush_applies_after_multipliers() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        ledger.total_essence = 1_000_000;
        for _ in 0..6 {
            ledger.purchase(UpgradeKey::EssenceGain).unwrap();
        }
        session.activate_power_up(PowerUpKind::EssenceRush, 7.0, &tuning, &ledger);
        place_food(&mut session, -2, 0);

        tick(&mut session, &tuning, &mut ledger);
        // floor(floor(1 * 2.2) * 2.5)
        assert_eq!(session.run.run_essence, 5);
    }

    #[test]
    fn test_essence_rush_boosts_food() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        session.activate_power_up(PowerUpKind::EssenceRush, 7.0, &tuning, &ledger);
        place_food(&mut session, -2, 0);

        tick(&mut session, &tuning, &mut ledger);
        assert_eq!(session.run.run_essence, 2);
    }

    #[test]
    fn test_wall_ends_run() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        session.run.next_direction = Direction::Up;

        // y = -1 ..= -10 are inside a radius-10 field
        for _ in 0..10 {
            assert_eq!(tick(&mut session, &tuning, &mut ledger), TickOutcome::Advanced);
        }
        assert_eq!(
            tick(&mut session, &tuning, &mut ledger),
            TickOutcome::Ended(WALL_REASON.to_string())
        );
        assert!(session.run.is_game_over());
        assert!(!session.run.can_process_input);
        assert_eq!(session.run.end_reason.as_deref(), Some(WALL_REASON));
        assert!(matches!(
            session.events().last(),
            Some(GameEvent::RunEnded { .. })
        ));
        // Ticks after the end do nothing
        assert_eq!(tick(&mut session, &tuning, &mut ledger), TickOutcome::Skipped);
    }

    #[test]
    fn test_shield_absorbs_one_wall_hit() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        session.activate_power_up(PowerUpKind::Shield, 30.0, &tuning, &ledger);
        session.run.next_direction = Direction::Up;

        for _ in 0..10 {
            tick(&mut session, &tuning, &mut ledger);
        }
        assert_eq!(
            tick(&mut session, &tuning, &mut ledger),
            TickOutcome::ShieldAbsorbed(Hazard::Wall)
        );
        assert_eq!(session.entities.snake.head().unwrap().pos, IVec2::new(-3, -10));
        assert!(!session.run.shield_active());
        assert_eq!(session.run.phase, GamePhase::Running);

        assert_eq!(
            tick(&mut session, &tuning, &mut ledger),
            TickOutcome::Ended(WALL_REASON.to_string())
        );
    }

    #[test]
    fn test_self_collision_ends_run() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        session.entities.snake.clear();
        for (x, y) in [(0, 0), (1, 0), (1, 1), (0, 1), (-1, 1)] {
            let id = session.entities.next_entity_id();
            session.entities.snake.push_tail(Segment {
                id,
                pos: IVec2::new(x, y),
            });
        }
        session.run.snake_length = 5;
        session.run.direction = Direction::Left;
        session.run.next_direction = Direction::Down;

        assert_eq!(
            tick(&mut session, &tuning, &mut ledger),
            TickOutcome::Ended(SELF_REASON.to_string())
        );
    }

    #[test]
    fn test_undersized_hostile_enemy_ends_run() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        // Void Sentinel needs size level 1
        place_enemy(&mut session, 2, -2, 0);

        assert_eq!(
            tick(&mut session, &tuning, &mut ledger),
            TickOutcome::Ended("Defeated by a Void Sentinel!".to_string())
        );
        assert_eq!(cells(&session)[0], IVec2::new(-3, 0));
    }

    #[test]
    fn test_defeat_enemy_awards_essence() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        place_enemy(&mut session, 1, -2, 0);

        assert_eq!(tick(&mut session, &tuning, &mut ledger), TickOutcome::Advanced);
        assert_eq!(session.run.run_essence, 5);
        assert_eq!(ledger.total_essence, 5);
        // No growth from enemies
        assert_eq!(session.run.snake_length, 3);
        // Replacement spawned somewhere else
        assert_eq!(session.entities.enemies.len(), 1);
        assert_ne!(session.entities.enemies[0].pos, IVec2::new(-2, 0));
    }

    #[test]
    fn test_harmless_enemy_kinds() {
        let mut tuning = Tuning::default();
        tuning.enemy_kinds[0].size_requirement = 5;
        tuning.enemy_kinds[3].hostile = false;
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);

        // Always-edible pellet is collected even when undersized
        place_enemy(&mut session, 0, -2, 0);
        tick(&mut session, &tuning, &mut ledger);
        assert_eq!(session.run.run_essence, 1);

        // A peaceful titan is simply passed over
        session.entities.enemies.clear();
        place_enemy(&mut session, 3, -1, 0);
        assert_eq!(tick(&mut session, &tuning, &mut ledger), TickOutcome::Advanced);
        assert_eq!(session.entities.enemies.len(), 1);
        assert_eq!(session.run.run_essence, 1);
    }

    #[test]
    fn test_power_up_pickup_activates() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        let id = session.entities.next_entity_id();
        session.entities.power_ups.push(PowerUpItem {
            id,
            kind: PowerUpKind::SpeedBoost,
            pos: IVec2::new(-2, 0),
        });

        tick(&mut session, &tuning, &mut ledger);
        assert!(session.entities.power_ups.is_empty());
        let active = session.run.active_power_up.unwrap();
        assert_eq!(active.kind, PowerUpKind::SpeedBoost);
        assert_eq!(active.time_left, ledger.power_up_duration());
        assert!(session.run.move_interval < ledger.move_interval());
    }

    #[test]
    fn test_size_level_up_on_milestone() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        ledger.upgrade_mut(UpgradeKey::GrowthPotential).value = 9.0;
        let mut session = arena(&tuning, &ledger);
        session.run.snake_length = 4;
        place_food(&mut session, -2, 0);

        tick(&mut session, &tuning, &mut ledger);
        assert_eq!(session.run.size_level, 1);
        assert_eq!(session.run.highest_size_level, 1);
        assert!(session.events().contains(&GameEvent::SizeLevelChanged {
            old: 0,
            new: 1,
            grid_radius: 13.0,
        }));
    }

    #[test]
    fn test_size_level_single_step_and_capped() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = arena(&tuning, &ledger);
        session.run.snake_length = 500;

        // growthPotential starts at 0: no level ups at all
        assert!(!check_size_level_up(&mut session, &tuning, &ledger));

        ledger.upgrade_mut(UpgradeKey::GrowthPotential).value = 2.0;
        assert!(check_size_level_up(&mut session, &tuning, &ledger));
        assert_eq!(session.run.size_level, 1);
        assert!(check_size_level_up(&mut session, &tuning, &ledger));
        assert!(!check_size_level_up(&mut session, &tuning, &ledger));
        assert_eq!(session.run.size_level, 2);
    }

    fn turn(dir: Direction, left: bool) -> Direction {
        match (dir, left) {
            (Direction::Up, true) | (Direction::Down, false) => Direction::Left,
            (Direction::Up, false) | (Direction::Down, true) => Direction::Right,
            (Direction::Left, true) | (Direction::Right, false) => Direction::Down,
            (Direction::Left, false) | (Direction::Right, true) => Direction::Up,
        }
    }

    proptest! {
        #[test]
        fn prop_length_matches_segments(
            seed in any::<u64>(),
            moves in prop::collection::vec(prop::option::of(any::<bool>()), 1..200),
        ) {
            let tuning = Tuning::default();
            let mut ledger = EconomyLedger::new(&tuning);
            ledger.upgrade_mut(UpgradeKey::GrowthPotential).value = 4.0;
            ledger.upgrade_mut(UpgradeKey::PowerUpChance).value = 0.5;
            let mut session = GameSession::new(ledger.move_interval());
            session.begin_run(seed, &tuning, &ledger);

            for step in moves {
                if let Some(left) = step {
                    session.run.next_direction = turn(session.run.direction, left);
                }
                let before = session.run.snake_length;
                let outcome = tick(&mut session, &tuning, &mut ledger);

                prop_assert_eq!(session.run.snake_length as usize, session.entities.snake.len());
                prop_assert!(session.run.snake_length - before <= 1);
                prop_assert!(session.run.size_level <= ledger.max_size_level());
                prop_assert!(session.entities.enemies.len() <= tuning.max_enemies);
                prop_assert!(session.entities.power_ups.len() <= 1);
                if matches!(outcome, TickOutcome::Ended(_)) {
                    break;
                }
            }
        }
    }
}
