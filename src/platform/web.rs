//! JS binding for the browser build
//!
//! The page owns rendering, DOM and audio. It drives a [`WebGame`] from its
//! `requestAnimationFrame` loop and reads events back as JSON.

use std::sync::Once;

use wasm_bindgen::prelude::*;

use super::storage::LocalStorageStore;
use crate::economy::{Currency, UpgradeKey};
use crate::presentation::{HudView, sound_cue, upgrade_cards};
use crate::session::SessionController;
use crate::sim::{Direction, TickOutcome};
use crate::tuning::Tuning;

static INIT: Once = Once::new();

/// Route panics and `log` output to the browser console
pub fn init_logging() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    });
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::warn!("Serialization failed: {}", e);
        "null".to_string()
    })
}

#[wasm_bindgen]
pub struct WebGame {
    ctrl: SessionController,
}

#[wasm_bindgen]
impl WebGame {
    /// `tuning_json` may override any balance value; invalid JSON falls back to defaults
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> WebGame {
        init_logging();

        let tuning = match tuning_json.as_deref().map(Tuning::from_json) {
            Some(Ok(tuning)) => tuning,
            Some(Err(e)) => {
                log::warn!("Ignoring tuning override: {}", e);
                Tuning::default()
            }
            None => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        log::info!("Serpent Scale ready (seed {})", seed);

        WebGame {
            ctrl: SessionController::new(tuning, Box::new(LocalStorageStore::default()), seed),
        }
    }

    pub fn start_run(&mut self) -> bool {
        self.ctrl.start_run()
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.ctrl.toggle_pause()
    }

    pub fn return_to_hub(&mut self) -> bool {
        self.ctrl.return_to_hub()
    }

    /// Arrow keys, WASD, or `p` for pause
    pub fn key_down(&mut self, key: &str) -> bool {
        if key.eq_ignore_ascii_case("p") {
            return self.ctrl.toggle_pause();
        }
        Direction::from_key(key).is_some_and(|dir| self.ctrl.set_desired_direction(dir))
    }

    /// Seconds since the previous frame. Returns true when the run just ended.
    pub fn advance_frame(&mut self, elapsed_seconds: f64) -> bool {
        matches!(
            self.ctrl.advance_frame(elapsed_seconds),
            TickOutcome::Ended(_)
        )
    }

    /// Upgrade key in camelCase, e.g. `moveSpeed`
    pub fn purchase(&mut self, key: &str) -> bool {
        UpgradeKey::from_str(key).is_some_and(|key| self.ctrl.purchase(key).is_ok())
    }

    pub fn prestige(&mut self) -> bool {
        self.ctrl.prestige().is_ok()
    }

    /// Pending events as `[{ "event": ..., "sound": "eat" | null }]`
    pub fn drain_events_json(&mut self) -> String {
        let events: Vec<_> = self
            .ctrl
            .drain_events()
            .into_iter()
            .map(|event| {
                let sound = sound_cue(&event).map(|c| c.name());
                serde_json::json!({ "event": event, "sound": sound })
            })
            .collect();
        to_json(&events)
    }

    pub fn hud_json(&self) -> String {
        to_json(&HudView::capture(&self.ctrl))
    }

    /// `prestige` selects the prestige-point cards
    pub fn upgrades_json(&self, prestige: bool) -> String {
        let currency = if prestige {
            Currency::PrestigePoints
        } else {
            Currency::Essence
        };
        to_json(&upgrade_cards(self.ctrl.ledger(), currency))
    }

    pub fn grid_radius(&self) -> f32 {
        self.ctrl.grid_radius()
    }
}
