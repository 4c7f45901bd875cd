//! Save/load of the economy snapshot
//!
//! Features:
//! - camelCase JSON matching what the browser build has always written
//! - Per-key merge over defaults (unknown keys ignored, missing keys kept)
//! - Load failures degrade to a fresh ledger

pub mod snapshot;
pub mod store;

pub use snapshot::{EconomySnapshot, UpgradeSnapshot};
pub use store::{MemoryStore, PersistenceError, SnapshotStore};

use crate::economy::EconomyLedger;
use crate::tuning::Tuning;

/// Load the ledger, surfacing any storage or format problem
pub fn try_load_ledger(
    store: &dyn SnapshotStore,
    tuning: &Tuning,
) -> Result<EconomyLedger, PersistenceError> {
    let mut ledger = EconomyLedger::new(tuning);
    if let Some(json) = store.load()? {
        EconomySnapshot::from_json(&json)?.merge_into(&mut ledger);
        log::info!(
            "Loaded progress: {} essence, {} prestige points",
            ledger.total_essence,
            ledger.prestige_points
        );
    }
    Ok(ledger)
}

/// Load the ledger, falling back to defaults when the save is unusable
pub fn load_ledger(store: &dyn SnapshotStore, tuning: &Tuning) -> EconomyLedger {
    try_load_ledger(store, tuning).unwrap_or_else(|e| {
        log::warn!("Could not load progress ({}), starting fresh", e);
        EconomyLedger::new(tuning)
    })
}

pub fn save_ledger(
    store: &mut dyn SnapshotStore,
    ledger: &EconomyLedger,
) -> Result<(), PersistenceError> {
    let json = EconomySnapshot::capture(ledger).to_json()?;
    store.save(&json)?;
    log::debug!("Progress saved ({} bytes)", json.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::UpgradeKey;

    #[test]
    fn test_empty_store_gives_fresh_ledger() {
        let tuning = Tuning::default();
        let ledger = load_ledger(&MemoryStore::new(), &tuning);
        assert_eq!(ledger, EconomyLedger::new(&tuning));
    }

    #[test]
    fn test_corrupt_save_falls_back() {
        let tuning = Tuning::default();
        let store = MemoryStore::with_json("{ definitely not json");
        assert!(matches!(
            try_load_ledger(&store, &tuning),
            Err(PersistenceError::Malformed(_))
        ));
        assert_eq!(load_ledger(&store, &tuning), EconomyLedger::new(&tuning));
    }

    #[test]
    fn test_save_then_load() {
        let tuning = Tuning::default();
        let mut ledger = EconomyLedger::new(&tuning);
        ledger.total_essence = 500;
        ledger.purchase(UpgradeKey::PowerUpChance).unwrap();

        let mut store = MemoryStore::new();
        save_ledger(&mut store, &ledger).unwrap();
        assert!(store.contents().is_some());
        assert_eq!(load_ledger(&store, &tuning), ledger);
    }

    #[test]
    fn test_legacy_save_with_catalog_fields() {
        // Older saves persisted the whole upgrade record, catalog fields included
        let tuning = Tuning::default();
        let store = MemoryStore::with_json(
            r#"{"totalEssence":120,"highestOverallSizeLevel":2,"prestigePoints":0,
                "nextPrestigeEssenceCost":15000,
                "upgrades":{"growthPotential":{"level":2,"value":2,"baseCost":50,
                "costMultiplier":1.8,"increment":1,"maxLevel":9,"label":"Max Size Level"}}}"#,
        );
        let ledger = load_ledger(&store, &tuning);
        assert_eq!(ledger.total_essence, 120);
        assert_eq!(ledger.max_size_level(), 2);
        assert_eq!(ledger.cost(UpgradeKey::GrowthPotential), 162);
    }
}
