//! Boundary between the simulation and whatever draws or plays it
//!
//! The core never touches a renderer or an audio context. It queues
//! [`GameEvent`]s; a [`Presenter`] turns them into meshes, DOM updates or
//! sounds.

use serde::Serialize;

use crate::economy::{Currency, EconomyLedger, Rarity, UpgradeKey, format_value};
use crate::session::SessionController;
use crate::sim::{EssenceSource, GameEvent, GamePhase};

/// Consumer of simulation events
pub trait Presenter {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F: FnMut(&GameEvent)> Presenter for F {
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

/// Writes every event to the log (used by the headless binary)
#[derive(Debug, Default)]
pub struct LogPresenter {
    /// Events seen so far
    pub seen: u64,
}

impl Presenter for LogPresenter {
    fn on_event(&mut self, event: &GameEvent) {
        self.seen += 1;
        match event {
            GameEvent::EntitySpawned { .. }
            | GameEvent::EntityRemoved { .. }
            | GameEvent::EntityMoved { .. }
            | GameEvent::SegmentBecameBody { .. } => log::trace!("{:?}", event),
            GameEvent::RunEnded { reason, stats } => log::info!(
                "Run ended: {} | size level {} | length {} | essence {}",
                reason,
                stats.size_level,
                stats.snake_length,
                stats.run_essence
            ),
            _ => log::debug!("{:?}", event),
        }
    }
}

/// Named sound effects the browser build loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Food eaten
    Eat,
    /// Enemy defeated or pellet collected
    EnemyDefeat,
    GameOver,
    /// Size level reached
    LevelUp,
    /// Power-up picked up
    PowerUp,
    /// Shield soaked a collision
    ShieldHit,
    /// Upgrade bought
    UiClick,
    Prestige,
}

impl SoundCue {
    /// Asset name on the JS side
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Eat => "eat",
            SoundCue::EnemyDefeat => "enemyDefeat",
            SoundCue::GameOver => "gameOver",
            SoundCue::LevelUp => "levelUp",
            SoundCue::PowerUp => "powerUp",
            SoundCue::ShieldHit => "shieldHit",
            SoundCue::UiClick => "uiClick",
            SoundCue::Prestige => "prestige",
        }
    }
}

/// Sound to play for an event, if any
pub fn sound_cue(event: &GameEvent) -> Option<SoundCue> {
    match event {
        GameEvent::EssenceGained {
            source: EssenceSource::Food,
            ..
        } => Some(SoundCue::Eat),
        GameEvent::EssenceGained {
            source: EssenceSource::Enemy(_),
            ..
        } => Some(SoundCue::EnemyDefeat),
        GameEvent::RunEnded { .. } => Some(SoundCue::GameOver),
        GameEvent::SizeLevelChanged { .. } => Some(SoundCue::LevelUp),
        GameEvent::PowerUpActivated { .. } => Some(SoundCue::PowerUp),
        GameEvent::ShieldAbsorbed { .. } => Some(SoundCue::ShieldHit),
        GameEvent::PurchaseResolved { accepted: true, .. } => Some(SoundCue::UiClick),
        GameEvent::PrestigeResolved { accepted: true, .. } => Some(SoundCue::Prestige),
        _ => None,
    }
}

/// Everything the HUD shows, in one serializable bundle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HudView {
    pub phase: GamePhase,
    pub size_level: u32,
    pub snake_length: u32,
    pub run_essence: u64,
    pub highest_size_level: u32,
    pub grid_radius: f32,
    /// Label of the running power-up
    pub active_power_up: Option<&'static str>,
    pub power_up_time_left: f64,
    pub total_essence: u64,
    pub highest_overall_size_level: u32,
    pub prestige_points: u64,
    pub next_prestige_essence_cost: u64,
    pub can_prestige: bool,
}

impl HudView {
    pub fn capture(ctrl: &SessionController) -> Self {
        let run = ctrl.run();
        let ledger = ctrl.ledger();
        Self {
            phase: run.phase,
            size_level: run.size_level,
            snake_length: run.snake_length,
            run_essence: run.run_essence,
            highest_size_level: run.highest_size_level,
            grid_radius: ctrl.grid_radius(),
            active_power_up: run.active_power_up.map(|p| p.kind.label()),
            power_up_time_left: run.active_power_up.map_or(0.0, |p| p.time_left.max(0.0)),
            total_essence: ledger.total_essence,
            highest_overall_size_level: ledger.highest_overall_size_level,
            prestige_points: ledger.prestige_points,
            next_prestige_essence_cost: ledger.next_prestige_essence_cost,
            can_prestige: ledger.can_prestige(),
        }
    }
}

/// Data behind one upgrade card
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeCard {
    pub key: UpgradeKey,
    pub label: String,
    pub icon: String,
    pub rarity: Rarity,
    pub currency: Currency,
    pub level: u32,
    pub cost: u64,
    pub value: String,
    /// Preview after the next purchase; `None` once maxed
    pub next_value: Option<String>,
    pub maxed: bool,
    pub affordable: bool,
}

/// Cards for every upgrade paid in `currency`
pub fn upgrade_cards(ledger: &EconomyLedger, currency: Currency) -> Vec<UpgradeCard> {
    let max_size_level = ledger
        .upgrade(UpgradeKey::GrowthPotential)
        .def
        .max_level
        .unwrap_or(0);

    ledger
        .upgrades(currency)
        .map(|(key, state)| UpgradeCard {
            key,
            label: state.def.label.clone(),
            icon: state.def.icon.clone(),
            rarity: state.def.rarity,
            currency,
            level: state.level,
            cost: state.cost(),
            value: format_value(key, state.value, max_size_level),
            next_value: state
                .next_value()
                .map(|v| format_value(key, v, max_size_level)),
            maxed: state.is_maxed(),
            affordable: ledger.can_afford(key),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::Hazard;
    use crate::tuning::{EnemyKindId, Tuning};

    #[test]
    fn test_sound_cues() {
        let food = GameEvent::EssenceGained {
            amount: 1,
            source: EssenceSource::Food,
        };
        let kill = GameEvent::EssenceGained {
            amount: 5,
            source: EssenceSource::Enemy(EnemyKindId(1)),
        };
        assert_eq!(sound_cue(&food), Some(SoundCue::Eat));
        assert_eq!(sound_cue(&kill), Some(SoundCue::EnemyDefeat));
        assert_eq!(
            sound_cue(&GameEvent::ShieldAbsorbed {
                hazard: Hazard::Wall
            })
            .map(|c| c.name()),
            Some("shieldHit")
        );
        assert_eq!(
            sound_cue(&GameEvent::PurchaseResolved {
                key: UpgradeKey::MoveSpeed,
                accepted: false
            }),
            None
        );
        assert_eq!(sound_cue(&GameEvent::Paused), None);
    }

    #[test]
    fn test_closure_presenter() {
        let mut count = 0;
        {
            let mut presenter = |_: &GameEvent| count += 1;
            presenter.on_event(&GameEvent::Paused);
            presenter.on_event(&GameEvent::Resumed);
        }
        assert_eq!(count, 2);

        let mut log = LogPresenter::default();
        log.on_event(&GameEvent::Paused);
        assert_eq!(log.seen, 1);
    }

    #[test]
    fn test_hud_view_tracks_run() {
        let mut ctrl = SessionController::new(Tuning::default(), Box::new(MemoryStore::new()), 5);
        let idle = HudView::capture(&ctrl);
        assert_eq!(idle.phase, GamePhase::Idle);
        assert_eq!(idle.active_power_up, None);

        ctrl.start_run();
        let hud = HudView::capture(&ctrl);
        assert_eq!(hud.phase, GamePhase::Running);
        assert_eq!(hud.snake_length, 3);
        assert_eq!(hud.grid_radius, 10.0);
        assert!(!hud.can_prestige);

        let json = serde_json::to_string(&hud).unwrap();
        assert!(json.contains("\"snakeLength\":3"));
    }

    #[test]
    fn test_upgrade_cards() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        ledger.total_essence = 60;

        let cards = upgrade_cards(&ledger, Currency::Essence);
        assert_eq!(cards.len(), UpgradeKey::REGULAR.len());
        let speed = cards.iter().find(|c| c.key == UpgradeKey::MoveSpeed).unwrap();
        assert_eq!(speed.value, "0.200s");
        assert_eq!(speed.next_value.as_deref(), Some("0.193s"));
        assert!(speed.affordable);
        let rate = cards.iter().find(|c| c.key == UpgradeKey::PowerUpChance).unwrap();
        assert!(!rate.affordable);

        let prestige = upgrade_cards(&ledger, Currency::PrestigePoints);
        assert_eq!(prestige.len(), 2);
        assert!(prestige.iter().all(|c| c.currency == Currency::PrestigePoints));
    }
}
