//! Session controller: run lifecycle, frame loop and economy transactions
//!
//! Owns everything a front end needs: tuning, the persistent ledger, the
//! snapshot store and the current [`GameSession`]. Front ends feed it input
//! and frame times, then drain events.

use crate::economy::{EconomyLedger, PrestigeRejection, PurchaseRejection, UpgradeKey};
use crate::persistence::{self, PersistenceError, SnapshotStore};
use crate::presentation::Presenter;
use crate::sim::{
    Direction, EntityRegistry, GameEvent, GamePhase, GameSession, RunState, TickOutcome, tick,
};
use crate::tuning::Tuning;

pub struct SessionController {
    tuning: Tuning,
    ledger: EconomyLedger,
    session: GameSession,
    store: Box<dyn SnapshotStore>,
    next_seed: u64,
}

impl SessionController {
    /// Load saved progress from `store` and wait in the hub
    pub fn new(tuning: Tuning, store: Box<dyn SnapshotStore>, seed: u64) -> Self {
        let ledger = persistence::load_ledger(store.as_ref(), &tuning);
        let session = GameSession::new(ledger.move_interval());
        Self {
            tuning,
            ledger,
            session,
            store,
            next_seed: seed,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn ledger(&self) -> &EconomyLedger {
        &self.ledger
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn run(&self) -> &RunState {
        &self.session.run
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.session.entities
    }

    pub fn phase(&self) -> GamePhase {
        self.session.run.phase
    }

    /// Half-extent of the playfield for the current size level
    pub fn grid_radius(&self) -> f32 {
        self.session.grid_radius(&self.tuning)
    }

    /// Begin a fresh run. Refused while a run is in progress.
    pub fn start_run(&mut self) -> bool {
        if matches!(self.phase(), GamePhase::Running | GamePhase::Paused) {
            return false;
        }
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);
        self.session.begin_run(seed, &self.tuning, &self.ledger);
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.phase() != GamePhase::Running {
            return false;
        }
        self.session.run.phase = GamePhase::Paused;
        self.session.emit(GameEvent::Paused);
        log::debug!("Paused");
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase() != GamePhase::Paused {
            return false;
        }
        self.session.run.phase = GamePhase::Running;
        self.session.emit(GameEvent::Resumed);
        log::debug!("Resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase() {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Buffer a turn for the next tick. Turns along the current axis are ignored.
    pub fn set_desired_direction(&mut self, direction: Direction) -> bool {
        let run = &mut self.session.run;
        if run.phase != GamePhase::Running
            || !run.can_process_input
            || !direction.is_perpendicular_to(run.direction)
        {
            return false;
        }
        run.next_direction = direction;
        true
    }

    /// Advance by one rendered frame: continuous effects every frame, at most
    /// one tick.
    pub fn advance_frame(&mut self, elapsed_seconds: f64) -> TickOutcome {
        if self.phase() != GamePhase::Running {
            return TickOutcome::Skipped;
        }
        let dt = if elapsed_seconds.is_finite() {
            elapsed_seconds.clamp(0.0, self.tuning.max_frame_dt)
        } else {
            0.0
        };

        self.session.run.move_accumulator += dt;
        self.session.update_power_up(dt, &self.tuning, &self.ledger);

        let run = &mut self.session.run;
        if run.move_accumulator < run.move_interval {
            return TickOutcome::Skipped;
        }
        run.move_accumulator -= run.move_interval;

        let outcome = tick(&mut self.session, &self.tuning, &mut self.ledger);
        if matches!(outcome, TickOutcome::Ended(_)) {
            self.persist();
        }
        outcome
    }

    /// End the current run from outside the tick (e.g. the player quits)
    pub fn trigger_game_over(&mut self, reason: &str) -> bool {
        if !matches!(self.phase(), GamePhase::Running | GamePhase::Paused) {
            return false;
        }
        self.session.end_run(reason, &mut self.ledger);
        self.persist();
        true
    }

    /// Leave the game-over screen
    pub fn return_to_hub(&mut self) -> bool {
        if self.phase() != GamePhase::GameOver {
            return false;
        }
        self.session.run.phase = GamePhase::Idle;
        true
    }

    pub fn purchase(&mut self, key: UpgradeKey) -> Result<u64, PurchaseRejection> {
        let result = self.ledger.purchase(key);
        self.session.emit(GameEvent::PurchaseResolved {
            key,
            accepted: result.is_ok(),
        });
        match &result {
            Ok(_) => self.persist(),
            Err(e) => log::debug!("Purchase of {} rejected: {}", key.as_str(), e),
        }
        result
    }

    /// Only allowed between runs
    pub fn prestige(&mut self) -> Result<u64, PrestigeRejection> {
        let result = match self.phase() {
            GamePhase::Running | GamePhase::Paused => Err(PrestigeRejection::RunInProgress),
            GamePhase::Idle | GamePhase::GameOver => self.ledger.prestige(),
        };
        self.session.emit(GameEvent::PrestigeResolved {
            accepted: result.is_ok(),
            prestige_points: self.ledger.prestige_points,
        });
        match &result {
            Ok(_) => self.persist(),
            Err(e) => log::debug!("Prestige rejected: {}", e),
        }
        result
    }

    /// Write the ledger to the store
    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        self.ledger
            .record_size_level(self.session.run.highest_size_level);
        persistence::save_ledger(self.store.as_mut(), &self.ledger)
    }

    fn persist(&mut self) {
        if let Err(e) = self.flush() {
            log::warn!("Could not save progress: {}", e);
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }

    /// Hand every pending event to `presenter`; returns how many were sent
    pub fn dispatch(&mut self, presenter: &mut dyn Presenter) -> usize {
        let events = self.session.drain_events();
        for event in &events {
            presenter.on_event(event);
        }
        events.len()
    }
}
