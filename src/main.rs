//! Serpent Scale entry point
//!
//! On the web the page constructs a `WebGame` and drives it; this only wires up
//! logging. Natively it plays a few headless runs with a simple autopilot,
//! spending essence between runs, which is handy for balance checks.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    serpent_scale::platform::web::init_logging();
    log::info!("Serpent Scale (web) loaded");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use serpent_scale::economy::UpgradeKey;
    use serpent_scale::persistence::{MemoryStore, SnapshotStore};
    use serpent_scale::platform::FileStore;
    use serpent_scale::presentation::LogPresenter;
    use serpent_scale::sim::{Direction, GamePhase, TickOutcome, in_bounds};
    use serpent_scale::{SessionController, Tuning};

    const FRAME_DT: f64 = 1.0 / 60.0;
    /// Give up on a run after this many simulated frames
    const MAX_FRAMES_PER_RUN: u32 = 60 * 180;

    /// Pick the safe direction that gets closest to the food
    fn autopilot(ctrl: &SessionController) -> Option<Direction> {
        let run = ctrl.run();
        let reg = ctrl.entities();
        let head = reg.snake.head()?.pos;
        let radius = ctrl.grid_radius();
        let target = reg.food.as_ref().map(|f| f.pos).unwrap_or(head);

        let is_safe = |dir: Direction| {
            let cell = head + dir.delta();
            if !in_bounds(cell, radius) || reg.snake.body_contains(cell) {
                return false;
            }
            reg.enemies.iter().filter(|e| e.pos == cell).all(|e| {
                ctrl.tuning()
                    .enemy_kind(e.kind)
                    .is_none_or(|k| !k.hostile || run.size_level >= k.size_requirement)
            })
        };

        Direction::ALL
            .into_iter()
            .filter(|&dir| dir != run.direction.opposite() && is_safe(dir))
            .min_by_key(|&dir| {
                let d = target - (head + dir.delta());
                d.x.abs() + d.y.abs()
            })
    }

    /// Spend everything affordable, cheapest first
    fn shop(ctrl: &mut SessionController) {
        loop {
            let cheapest = UpgradeKey::ALL
                .into_iter()
                .filter(|&k| ctrl.ledger().can_afford(k))
                .min_by_key(|&k| ctrl.ledger().cost(k));
            match cheapest {
                Some(key) => {
                    let _ = ctrl.purchase(key);
                }
                None => break,
            }
        }
        if ctrl.ledger().can_prestige() {
            let _ = ctrl.prestige();
        }
    }

    pub fn run(runs: u32, save_path: Option<String>) {
        let store: Box<dyn SnapshotStore> = match save_path {
            Some(path) => Box::new(FileStore::new(path)),
            None => Box::new(MemoryStore::new()),
        };
        let mut ctrl = SessionController::new(Tuning::default(), store, 0x5EED);
        let mut presenter = LogPresenter::default();

        for n in 1..=runs {
            ctrl.start_run();
            let mut frames = 0;
            while ctrl.phase() == GamePhase::Running && frames < MAX_FRAMES_PER_RUN {
                if let Some(dir) = autopilot(&ctrl) {
                    ctrl.set_desired_direction(dir);
                }
                if let TickOutcome::Ended(reason) = ctrl.advance_frame(FRAME_DT) {
                    log::info!("Run {} ended after {} frames: {}", n, frames, reason);
                }
                ctrl.dispatch(&mut presenter);
                frames += 1;
            }
            if ctrl.phase() == GamePhase::Running {
                ctrl.trigger_game_over("Autopilot ran out of time");
            }
            ctrl.dispatch(&mut presenter);

            shop(&mut ctrl);
            ctrl.dispatch(&mut presenter);
            ctrl.return_to_hub();

            let ledger = ctrl.ledger();
            log::info!(
                "After run {}: {} essence, {} prestige points, best size level {}",
                n,
                ledger.total_essence,
                ledger.prestige_points,
                ledger.highest_overall_size_level
            );
        }
        log::info!("{} events observed", presenter.seen);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Serpent Scale (native) starting headless autopilot...");

    let mut args = std::env::args().skip(1);
    let runs = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
    let save_path = args.next();
    headless::run(runs, save_path);
}
