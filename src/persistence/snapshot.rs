//! Persisted shape of the economy
//!
//! Every field is optional and numeric fields are read as `f64`, so saves from
//! older builds (or hand-edited ones) load with whatever they still carry.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::economy::{Currency, EconomyLedger, UpgradeKey};

/// Level and value of one owned upgrade
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeSnapshot {
    pub level: Option<f64>,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EconomySnapshot {
    pub total_essence: Option<f64>,
    pub highest_overall_size_level: Option<f64>,
    pub prestige_points: Option<f64>,
    pub next_prestige_essence_cost: Option<f64>,
    #[serde(deserialize_with = "lenient_book")]
    pub upgrades: BTreeMap<String, UpgradeSnapshot>,
    #[serde(deserialize_with = "lenient_book")]
    pub prestige_upgrades: BTreeMap<String, UpgradeSnapshot>,
}

/// Upgrade book that skips unreadable entries (null, wrong shape) instead of
/// rejecting the whole save. A null or non-object book reads as empty.
fn lenient_book<'de, D>(deserializer: D) -> Result<BTreeMap<String, UpgradeSnapshot>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, entry)| match UpgradeSnapshot::deserialize(entry) {
            Ok(snap) => Some((key, snap)),
            Err(e) => {
                log::debug!("Skipping saved upgrade {}: {}", key, e);
                None
            }
        })
        .collect())
}

/// Non-negative whole number, or nothing
fn whole(v: Option<f64>) -> Option<u64> {
    v.filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.floor() as u64)
}

impl EconomySnapshot {
    /// Capture the ledger as it stands
    pub fn capture(ledger: &EconomyLedger) -> Self {
        let book = |currency: Currency| -> BTreeMap<String, UpgradeSnapshot> {
            ledger
                .upgrades(currency)
                .map(|(key, state)| {
                    let snap = UpgradeSnapshot {
                        level: Some(state.level as f64),
                        value: Some(state.value),
                    };
                    (key.as_str().to_string(), snap)
                })
                .collect()
        };

        Self {
            total_essence: Some(ledger.total_essence as f64),
            highest_overall_size_level: Some(ledger.highest_overall_size_level as f64),
            prestige_points: Some(ledger.prestige_points as f64),
            next_prestige_essence_cost: Some(ledger.next_prestige_essence_cost as f64),
            upgrades: book(Currency::Essence),
            prestige_upgrades: book(Currency::PrestigePoints),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Overlay this snapshot onto a ledger, key by key.
    ///
    /// Missing scalars fall back to zero (or the base prestige cost), missing
    /// upgrades keep the ledger's state, and unknown keys are ignored. Levels
    /// are clamped to the catalog's max level and values to its floor.
    pub fn merge_into(&self, ledger: &mut EconomyLedger) {
        ledger.total_essence = whole(self.total_essence).unwrap_or(0);
        ledger.highest_overall_size_level = whole(self.highest_overall_size_level)
            .map_or(0, |v| v.min(u32::MAX as u64) as u32);
        ledger.prestige_points = whole(self.prestige_points).unwrap_or(0);
        if let Some(cost) = whole(self.next_prestige_essence_cost).filter(|&c| c > 0) {
            ledger.next_prestige_essence_cost = cost;
        }

        let books = [
            (&self.upgrades, &UpgradeKey::REGULAR[..]),
            (&self.prestige_upgrades, &UpgradeKey::PRESTIGE[..]),
        ];
        for (saved, keys) in books {
            for &key in keys {
                let Some(snap) = saved.get(key.as_str()) else {
                    continue;
                };
                let state = ledger.upgrade_mut(key);
                if let Some(level) = whole(snap.level) {
                    let level = level.min(u32::MAX as u64) as u32;
                    state.level = state.def.max_level.map_or(level, |max| level.min(max));
                }
                if let Some(value) = snap.value.filter(|v| v.is_finite()) {
                    state.value = state.def.floor.map_or(value, |floor| value.max(floor));
                }
            }
        }
    }
}
