//! Essence economy: upgrade catalog, cost curves, purchases and prestige
//!
//! Two currencies share one purchase path. Regular upgrades are bought with
//! essence and wiped by a prestige; prestige upgrades are bought with prestige
//! points and survive it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::tuning::Tuning;

/// Which balance an upgrade is paid from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Essence,
    PrestigePoints,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Essence => "E",
            Currency::PrestigePoints => "PP",
        }
    }
}

/// Every purchasable upgrade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeKey {
    /// Highest size level reachable in a run
    GrowthPotential,
    /// Seconds between ticks (lower is faster)
    MoveSpeed,
    /// Multiplier on every essence pickup
    EssenceGain,
    /// Chance to spawn a power-up when food is eaten
    PowerUpChance,
    /// Power-up duration in seconds
    PowerUpDuration,
    /// Prestige: multiplier on every essence pickup
    GlobalEssenceBoost,
    /// Prestige: begin each run shielded
    StartWithShield,
}

impl UpgradeKey {
    pub const REGULAR: [UpgradeKey; 5] = [
        UpgradeKey::GrowthPotential,
        UpgradeKey::MoveSpeed,
        UpgradeKey::EssenceGain,
        UpgradeKey::PowerUpChance,
        UpgradeKey::PowerUpDuration,
    ];

    pub const PRESTIGE: [UpgradeKey; 2] =
        [UpgradeKey::GlobalEssenceBoost, UpgradeKey::StartWithShield];

    pub const ALL: [UpgradeKey; 7] = [
        UpgradeKey::GrowthPotential,
        UpgradeKey::MoveSpeed,
        UpgradeKey::EssenceGain,
        UpgradeKey::PowerUpChance,
        UpgradeKey::PowerUpDuration,
        UpgradeKey::GlobalEssenceBoost,
        UpgradeKey::StartWithShield,
    ];

    pub fn currency(&self) -> Currency {
        match self {
            UpgradeKey::GlobalEssenceBoost | UpgradeKey::StartWithShield => {
                Currency::PrestigePoints
            }
            _ => Currency::Essence,
        }
    }

    /// Save-file key
    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKey::GrowthPotential => "growthPotential",
            UpgradeKey::MoveSpeed => "moveSpeed",
            UpgradeKey::EssenceGain => "essenceGain",
            UpgradeKey::PowerUpChance => "powerUpChance",
            UpgradeKey::PowerUpDuration => "powerUpDuration",
            UpgradeKey::GlobalEssenceBoost => "globalEssenceBoost",
            UpgradeKey::StartWithShield => "startWithShield",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        UpgradeKey::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Card rarity shown by the upgrade UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
}

/// Static catalog entry for one upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeDef {
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub rarity: Rarity,
    pub base_cost: f64,
    pub cost_multiplier: f64,
    /// Effect magnitude at level 0; prestige resets to this
    pub base_value: f64,
    /// Added to the value on each purchase
    pub increment: f64,
    #[serde(default)]
    pub max_level: Option<u32>,
    /// Lower clamp applied after each increment
    #[serde(default)]
    pub floor: Option<f64>,
}

impl UpgradeDef {
    /// Built-in catalog entry (`max_size_level` caps growth potential)
    pub fn builtin(key: UpgradeKey, max_size_level: u32) -> Self {
        let def = |label: &str, icon: &str, rarity, base_cost, cost_multiplier, base_value, increment| {
            UpgradeDef {
                label: label.to_string(),
                icon: icon.to_string(),
                rarity,
                base_cost,
                cost_multiplier,
                base_value,
                increment,
                max_level: None,
                floor: None,
            }
        };

        match key {
            UpgradeKey::GrowthPotential => UpgradeDef {
                max_level: Some(max_size_level),
                ..def("Max Size Level", "🌱", Rarity::Epic, 50.0, 1.8, 0.0, 1.0)
            },
            UpgradeKey::MoveSpeed => UpgradeDef {
                max_level: Some(15),
                floor: Some(MOVE_INTERVAL_FLOOR),
                ..def("Move Speed", "⏩", Rarity::Common, 50.0, 1.8, INITIAL_MOVE_INTERVAL, -0.007)
            },
            UpgradeKey::EssenceGain => def("Essence Gain", "💎", Rarity::Rare, 30.0, 1.6, 1.0, 0.2),
            UpgradeKey::PowerUpChance => UpgradeDef {
                max_level: Some(20),
                ..def("Power-up Rate", "⭐", Rarity::Rare, 75.0, 1.7, 0.08, 0.02)
            },
            UpgradeKey::PowerUpDuration => {
                def("Power-up Time", "⏱️", Rarity::Common, 60.0, 1.5, POWERUP_DURATION, 1.0)
            }
            UpgradeKey::GlobalEssenceBoost => {
                def("Global Essence Boost (%)", "✨", Rarity::Epic, 1.0, 2.0, 1.0, 0.05)
            }
            UpgradeKey::StartWithShield => UpgradeDef {
                max_level: Some(1),
                ..def("Start with Shield", "🛡️", Rarity::Epic, 3.0, 3.0, 0.0, 1.0)
            },
        }
    }

    /// `floor(base_cost * cost_multiplier ^ level)`
    pub fn cost_at(&self, level: u32) -> u64 {
        (self.base_cost * self.cost_multiplier.powi(level as i32)).floor() as u64
    }

    /// Value after one more purchase
    pub fn value_after(&self, value: f64) -> f64 {
        let next = value + self.increment;
        match self.floor {
            Some(floor) => next.max(floor),
            None => next,
        }
    }
}

/// The built-in upgrade catalog
pub fn default_upgrade_catalog(max_size_level: u32) -> BTreeMap<UpgradeKey, UpgradeDef> {
    UpgradeKey::ALL
        .into_iter()
        .map(|key| (key, UpgradeDef::builtin(key, max_size_level)))
        .collect()
}

/// Owned level and current value of one upgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeState {
    pub def: UpgradeDef,
    pub level: u32,
    pub value: f64,
}

impl UpgradeState {
    pub fn new(def: UpgradeDef) -> Self {
        let value = def.base_value;
        Self {
            def,
            level: 0,
            value,
        }
    }

    pub fn cost(&self) -> u64 {
        self.def.cost_at(self.level)
    }

    pub fn is_maxed(&self) -> bool {
        self.def.max_level.is_some_and(|max| self.level >= max)
    }

    /// Preview of the value after the next purchase (None when maxed)
    pub fn next_value(&self) -> Option<f64> {
        if self.is_maxed() {
            None
        } else {
            Some(self.def.value_after(self.value))
        }
    }

    fn reset(&mut self) {
        self.level = 0;
        self.value = self.def.base_value;
    }
}

/// Why a purchase was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseRejection {
    #[error("costs {cost} but only {available} available")]
    InsufficientFunds { cost: u64, available: u64 },
    #[error("already at max level")]
    MaxLevel,
}

/// Why a prestige was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PrestigeRejection {
    #[error("prestige needs {required} essence, have {available}")]
    InsufficientEssence { required: u64, available: u64 },
    #[error("cannot prestige during a run")]
    RunInProgress,
}

/// Persistent economy state
#[derive(Debug, Clone, PartialEq)]
pub struct EconomyLedger {
    pub total_essence: u64,
    pub highest_overall_size_level: u32,
    pub prestige_points: u64,
    pub next_prestige_essence_cost: u64,
    upgrades: BTreeMap<UpgradeKey, UpgradeState>,
    prestige_upgrades: BTreeMap<UpgradeKey, UpgradeState>,
    prestige_cost_growth: f64,
}

impl EconomyLedger {
    /// Fresh ledger with every upgrade at level 0
    pub fn new(tuning: &Tuning) -> Self {
        let book = |keys: &[UpgradeKey]| {
            keys.iter()
                .map(|&key| (key, UpgradeState::new(tuning.upgrade_def(key))))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            total_essence: 0,
            highest_overall_size_level: 0,
            prestige_points: 0,
            next_prestige_essence_cost: tuning.prestige_base_cost,
            upgrades: book(&UpgradeKey::REGULAR),
            prestige_upgrades: book(&UpgradeKey::PRESTIGE),
            prestige_cost_growth: tuning.prestige_cost_growth,
        }
    }

    fn book(&self, currency: Currency) -> &BTreeMap<UpgradeKey, UpgradeState> {
        match currency {
            Currency::Essence => &self.upgrades,
            Currency::PrestigePoints => &self.prestige_upgrades,
        }
    }

    /// Every key is inserted at construction, so lookups cannot miss
    pub fn upgrade(&self, key: UpgradeKey) -> &UpgradeState {
        &self.book(key.currency())[&key]
    }

    pub(crate) fn upgrade_mut(&mut self, key: UpgradeKey) -> &mut UpgradeState {
        let book = match key.currency() {
            Currency::Essence => &mut self.upgrades,
            Currency::PrestigePoints => &mut self.prestige_upgrades,
        };
        book.entry(key)
            .or_insert_with(|| UpgradeState::new(UpgradeDef::builtin(key, 0)))
    }

    /// Upgrades paid in one currency, in catalog order
    pub fn upgrades(&self, currency: Currency) -> impl Iterator<Item = (UpgradeKey, &UpgradeState)> {
        self.book(currency).iter().map(|(k, v)| (*k, v))
    }

    pub fn value(&self, key: UpgradeKey) -> f64 {
        self.upgrade(key).value
    }

    pub fn level(&self, key: UpgradeKey) -> u32 {
        self.upgrade(key).level
    }

    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Essence => self.total_essence,
            Currency::PrestigePoints => self.prestige_points,
        }
    }

    fn balance_mut(&mut self, currency: Currency) -> &mut u64 {
        match currency {
            Currency::Essence => &mut self.total_essence,
            Currency::PrestigePoints => &mut self.prestige_points,
        }
    }

    pub fn cost(&self, key: UpgradeKey) -> u64 {
        self.upgrade(key).cost()
    }

    pub fn can_afford(&self, key: UpgradeKey) -> bool {
        let upgrade = self.upgrade(key);
        !upgrade.is_maxed() && self.balance(key.currency()) >= upgrade.cost()
    }

    /// Buy one level. Returns the amount paid; a rejection leaves the ledger untouched.
    pub fn purchase(&mut self, key: UpgradeKey) -> Result<u64, PurchaseRejection> {
        let currency = key.currency();
        let available = self.balance(currency);
        let upgrade = self.upgrade(key);
        let cost = upgrade.cost();

        if upgrade.is_maxed() {
            return Err(PurchaseRejection::MaxLevel);
        }
        if available < cost {
            return Err(PurchaseRejection::InsufficientFunds { cost, available });
        }

        *self.balance_mut(currency) -= cost;
        let upgrade = self.upgrade_mut(key);
        upgrade.level += 1;
        upgrade.value = upgrade.def.value_after(upgrade.value);

        log::info!(
            "Purchased {} level {} for {} {}",
            key.as_str(),
            upgrade.level,
            cost,
            currency.symbol()
        );
        Ok(cost)
    }

    pub fn can_prestige(&self) -> bool {
        self.total_essence >= self.next_prestige_essence_cost
    }

    /// Trade all essence and regular upgrades for one prestige point.
    /// Returns the new prestige point total.
    pub fn prestige(&mut self) -> Result<u64, PrestigeRejection> {
        if !self.can_prestige() {
            return Err(PrestigeRejection::InsufficientEssence {
                required: self.next_prestige_essence_cost,
                available: self.total_essence,
            });
        }

        self.prestige_points += 1;
        self.total_essence = 0;
        for upgrade in self.upgrades.values_mut() {
            upgrade.reset();
        }
        self.next_prestige_essence_cost =
            (self.next_prestige_essence_cost as f64 * self.prestige_cost_growth).floor() as u64;

        log::info!(
            "Prestige! {} points, next prestige at {} essence",
            self.prestige_points,
            self.next_prestige_essence_cost
        );
        Ok(self.prestige_points)
    }

    pub fn credit_essence(&mut self, amount: u64) {
        self.total_essence = self.total_essence.saturating_add(amount);
    }

    /// Raise the all-time size level high-water mark
    pub fn record_size_level(&mut self, size_level: u32) {
        self.highest_overall_size_level = self.highest_overall_size_level.max(size_level);
    }

    // === Stat lookups used by the simulation ===

    /// Seconds between ticks at run start
    pub fn move_interval(&self) -> f64 {
        self.value(UpgradeKey::MoveSpeed)
    }

    /// Combined essence multiplier (upgrade gain × prestige boost)
    pub fn essence_multiplier(&self) -> f64 {
        self.value(UpgradeKey::EssenceGain) * self.value(UpgradeKey::GlobalEssenceBoost)
    }

    /// `floor(base * essence_multiplier)`
    pub fn scaled_essence(&self, base: u64) -> u64 {
        (base as f64 * self.essence_multiplier()).floor() as u64
    }

    pub fn power_up_chance(&self) -> f64 {
        self.value(UpgradeKey::PowerUpChance)
    }

    pub fn power_up_duration(&self) -> f64 {
        self.value(UpgradeKey::PowerUpDuration)
    }

    /// Highest size level a run may reach
    pub fn max_size_level(&self) -> u32 {
        self.value(UpgradeKey::GrowthPotential).max(0.0).floor() as u32
    }

    pub fn starts_with_shield(&self) -> bool {
        self.value(UpgradeKey::StartWithShield) > 0.0
    }
}

/// Human-readable upgrade value for upgrade cards
pub fn format_value(key: UpgradeKey, value: f64, max_size_level: u32) -> String {
    match key {
        UpgradeKey::GrowthPotential => {
            format!("Lvl {} (Max {})", value.max(0.0).floor() as u32, max_size_level)
        }
        UpgradeKey::MoveSpeed => format!("{:.3}s", value),
        UpgradeKey::PowerUpChance => format!("{:.0}%", value * 100.0),
        UpgradeKey::EssenceGain => format!("x{:.1}", value),
        UpgradeKey::GlobalEssenceBoost => format!("+{:.0}%", (value - 1.0) * 100.0),
        UpgradeKey::StartWithShield => {
            if value > 0.0 { "Active" } else { "Inactive" }.to_string()
        }
        UpgradeKey::PowerUpDuration => format!("{}", value.floor()),
    }
}
