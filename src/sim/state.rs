//! Run state and the per-run session
//!
//! Everything a run mutates lives in [`GameSession`]; persistent progress lives
//! in the [`EconomyLedger`] and is passed in explicitly.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::{EntityKind, EntityRegistry, Segment};
use super::events::{GameEvent, RunStats};
use super::grid::Direction;
use crate::consts::MAX_PENDING_EVENTS;
use crate::economy::EconomyLedger;
use crate::tuning::Tuning;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run yet, or back at the hub after a game over
    Idle,
    /// Ticks advance
    Running,
    /// Frozen until resumed
    Paused,
    /// Run ended; a new run must be started explicitly
    GameOver,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpKind {
    SpeedBoost,
    Shield,
    EssenceRush,
    FoodMagnet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::SpeedBoost,
        PowerUpKind::Shield,
        PowerUpKind::EssenceRush,
        PowerUpKind::FoodMagnet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::SpeedBoost => "Speed Boost",
            PowerUpKind::Shield => "Shield",
            PowerUpKind::EssenceRush => "Essence Rush",
            PowerUpKind::FoodMagnet => "Food Magnet",
        }
    }
}

/// The one effect currently running
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    /// Seconds remaining
    pub time_left: f64,
}

/// Per-run stats and flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub phase: GamePhase,
    pub direction: Direction,
    /// Buffered input, committed at the next tick
    pub next_direction: Direction,
    pub run_essence: u64,
    /// Always equal to the number of snake segments
    pub snake_length: u32,
    pub size_level: u32,
    pub highest_size_level: u32,
    pub move_accumulator: f64,
    /// Seconds between ticks (SPEED_BOOST shortens it)
    pub move_interval: f64,
    pub can_process_input: bool,
    pub active_power_up: Option<ActivePowerUp>,
    /// Ticks simulated this run
    pub ticks: u64,
    pub end_reason: Option<String>,
}

impl RunState {
    pub fn new(move_interval: f64) -> Self {
        Self {
            phase: GamePhase::Idle,
            direction: Direction::Right,
            next_direction: Direction::Right,
            run_essence: 0,
            snake_length: 0,
            size_level: 0,
            highest_size_level: 0,
            move_accumulator: 0.0,
            move_interval,
            can_process_input: false,
            active_power_up: None,
            ticks: 0,
            end_reason: None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active_power_up.is_some_and(|p| p.kind == kind)
    }

    pub fn shield_active(&self) -> bool {
        self.is_active(PowerUpKind::Shield)
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            run_essence: self.run_essence,
            size_level: self.size_level,
            highest_size_level: self.highest_size_level,
            snake_length: self.snake_length,
            ticks: self.ticks,
        }
    }
}

/// One run: state, entities, RNG and pending events.
///
/// Front ends must drain events every frame. The queue holds at most
/// [`MAX_PENDING_EVENTS`]; past that the oldest are discarded.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub run: RunState,
    pub entities: EntityRegistry,
    /// Seed of the current run
    pub seed: u64,
    pub(crate) rng: Pcg32,
    events: Vec<GameEvent>,
    /// Events discarded since the last drain
    dropped_events: u64,
}

impl GameSession {
    /// An idle session with nothing spawned
    pub fn new(move_interval: f64) -> Self {
        Self {
            run: RunState::new(move_interval),
            entities: EntityRegistry::new(),
            seed: 0,
            rng: Pcg32::seed_from_u64(0),
            events: Vec::new(),
            dropped_events: 0,
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
            self.dropped_events += 1;
            if self.dropped_events == 1 {
                log::warn!("Event queue full, dropping oldest events until drained");
            }
        }
        self.events.push(event);
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        if self.dropped_events > 0 {
            log::warn!("{} events were dropped before this drain", self.dropped_events);
            self.dropped_events = 0;
        }
        std::mem::take(&mut self.events)
    }

    /// Half-extent of the playfield at the current size level
    pub fn grid_radius(&self, tuning: &Tuning) -> f32 {
        tuning.grid_radius(self.run.size_level)
    }

    /// Reset everything and lay out a fresh run
    pub fn begin_run(&mut self, seed: u64, tuning: &Tuning, ledger: &EconomyLedger) {
        for event in self.removal_events() {
            self.emit(event);
        }

        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.entities.clear();
        self.run = RunState::new(ledger.move_interval());
        self.run.phase = GamePhase::Running;
        self.run.can_process_input = true;

        self.emit(GameEvent::RunStarted {
            seed,
            grid_radius: tuning.grid_radius(0),
        });

        // Head first, body trailing opposite the starting direction
        let back = self.run.direction.opposite().delta();
        for i in 0..tuning.initial_snake_segments.max(1) {
            let id = self.entities.next_entity_id();
            let pos = tuning.start_head + back * i as i32;
            self.entities.snake.push_tail(Segment { id, pos });
            self.emit(GameEvent::EntitySpawned {
                id,
                kind: self.entities.snake.kind_of(i),
                pos,
            });
        }
        self.run.snake_length = self.entities.snake.len() as u32;

        self.spawn_food(tuning);
        for _ in 0..tuning.initial_enemies {
            self.spawn_enemy(tuning, None);
        }

        if ledger.starts_with_shield() {
            let duration = ledger.power_up_duration() * tuning.starting_shield_duration_factor;
            self.activate_power_up(PowerUpKind::Shield, duration, tuning, ledger);
        }

        log::info!(
            "Run started (seed {}), snake length {}, interval {:.3}s",
            seed,
            self.run.snake_length,
            self.run.move_interval
        );
    }

    /// Stop the run: freeze input, bank the size level and report the summary
    pub fn end_run(&mut self, reason: impl Into<String>, ledger: &mut EconomyLedger) {
        if self.run.phase == GamePhase::GameOver {
            return;
        }
        let reason = reason.into();
        self.run.phase = GamePhase::GameOver;
        self.run.can_process_input = false;
        self.run.end_reason = Some(reason.clone());
        ledger.record_size_level(self.run.highest_size_level);

        log::info!(
            "Run over: {} (size level {}, length {}, {} essence)",
            reason,
            self.run.size_level,
            self.run.snake_length,
            self.run.run_essence
        );
        let stats = self.run.stats();
        self.emit(GameEvent::RunEnded { reason, stats });
    }

    /// Removal events for whatever a previous run left on the field
    fn removal_events(&self) -> Vec<GameEvent> {
        let reg = &self.entities;
        let snake = reg
            .snake
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id, reg.snake.kind_of(i), s.pos));
        let food = reg
            .food
            .iter()
            .map(|f| (f.id, EntityKind::Food, f.pos));
        let enemies = reg
            .enemies
            .iter()
            .map(|e| (e.id, EntityKind::Enemy(e.kind), e.pos));
        let power_ups = reg
            .power_ups
            .iter()
            .map(|p| (p.id, EntityKind::PowerUp(p.kind), p.pos));

        snake
            .chain(food)
            .chain(enemies)
            .chain(power_ups)
            .map(|(id, kind, pos)| GameEvent::EntityRemoved { id, kind, pos })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::UpgradeKey;
    use glam::IVec2;

    #[test]
    fn test_begin_run_layout() {
        let tuning = Tuning::default();
        let ledger = EconomyLedger::new(&tuning);
        let mut session = GameSession::new(ledger.move_interval());
        session.begin_run(7, &tuning, &ledger);

        let cells: Vec<_> = session.entities.snake.iter().map(|s| s.pos).collect();
        assert_eq!(
            cells,
            vec![IVec2::new(-3, 0), IVec2::new(-4, 0), IVec2::new(-5, 0)]
        );
        assert_eq!(session.run.snake_length, 3);
        assert_eq!(session.run.phase, GamePhase::Running);
        assert_eq!(session.run.direction, Direction::Right);
        assert!(session.entities.food.is_some());
        assert_eq!(session.entities.enemies.len(), 2);
        assert!(session.run.active_power_up.is_none());
        assert!(matches!(
            session.events().first(),
            Some(GameEvent::RunStarted { seed: 7, .. })
        ));
    }

    #[test]
    fn test_begin_run_grants_starting_shield() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        ledger.prestige_points = 3;
        ledger.purchase(UpgradeKey::StartWithShield).unwrap();

        let mut session = GameSession::new(ledger.move_interval());
        session.begin_run(1, &tuning, &ledger);

        let active = session.run.active_power_up.unwrap();
        assert_eq!(active.kind, PowerUpKind::Shield);
        assert!((active.time_left - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_begin_run_clears_previous_run() {
        let tuning = Tuning::default();
        let ledger = EconomyLedger::new(&tuning);
        let mut session = GameSession::new(ledger.move_interval());
        session.begin_run(1, &tuning, &ledger);
        session.run.run_essence = 40;
        session.run.size_level = 2;
        session.drain_events();

        session.begin_run(2, &tuning, &ledger);
        assert_eq!(session.run.run_essence, 0);
        assert_eq!(session.run.size_level, 0);
        assert_eq!(session.entities.snake.len(), 3);
        let removed = session
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::EntityRemoved { .. }))
            .count();
        // 3 segments + food + 2 enemies from the first run
        assert_eq!(removed, 6);
    }

    #[test]
    fn test_end_run_banks_size_level_once() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        let mut session = GameSession::new(ledger.move_interval());
        session.begin_run(1, &tuning, &ledger);
        session.run.highest_size_level = 4;
        session.drain_events();

        session.end_run("quit", &mut ledger);
        session.end_run("again", &mut ledger);

        assert!(session.run.is_game_over());
        assert_eq!(session.run.end_reason.as_deref(), Some("quit"));
        assert_eq!(ledger.highest_overall_size_level, 4);
        let ended = session
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::RunEnded { .. }))
            .count();
        assert_eq!(ended, 1);
    }

    #[test]
    fn test_undrained_queue_keeps_newest_events() {
        let tuning = Tuning::default();
        let ledger = EconomyLedger::new(&tuning);
        let mut session = GameSession::new(ledger.move_interval());
        for seed in 0..(MAX_PENDING_EVENTS as u64 + 10) {
            session.emit(GameEvent::RunStarted {
                seed,
                grid_radius: 10.0,
            });
        }

        let events = session.drain_events();
        assert_eq!(events.len(), MAX_PENDING_EVENTS);
        assert_eq!(events[0], GameEvent::RunStarted { seed: 10, grid_radius: 10.0 });
        assert!(session.events().is_empty());
    }
}
