//! On-disk persistence for a run.
//!
//! Layout under the data directory:
//!
//! ```text
//! state.json              current canonical state
//! initial.json            state as constructed (rollback floor)
//! ledger.json             all committed day records
//! snapshots/day_NNNNNN.json   one post-day snapshot per simulated day
//! ```
//!
//! Snapshot files hold the exact serialized form the in-memory store keeps,
//! so a save/load cycle is byte-preserving. Loaded canonical state is
//! validated before a `Simulation` is handed back; a file that breaks the
//! state invariants fails the load rather than limping on.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::config::SimConfig;
use crate::core::error::Result;
use crate::core::types::Day;
use crate::sim::ledger::{DayResult, Ledger};
use crate::sim::runner::Simulation;
use crate::sim::snapshot::SnapshotStore;
use crate::sim::state::SimState;

const STATE_FILE: &str = "state.json";
const INITIAL_FILE: &str = "initial.json";
const LEDGER_FILE: &str = "ledger.json";
const SNAPSHOT_DIR: &str = "snapshots";

pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a saved run exists in this directory.
    pub fn exists(&self) -> bool {
        self.root.join(STATE_FILE).is_file()
    }

    /// Write the whole run, pruning snapshot files for days that no longer
    /// exist (after a rollback or reset).
    pub fn save(&self, sim: &Simulation) -> Result<()> {
        let snap_dir = self.root.join(SNAPSHOT_DIR);
        fs::create_dir_all(&snap_dir)?;

        fs::write(
            self.root.join(STATE_FILE),
            serde_json::to_string_pretty(sim.state())?,
        )?;
        fs::write(
            self.root.join(INITIAL_FILE),
            serde_json::to_string_pretty(sim.initial_state())?,
        )?;
        fs::write(
            self.root.join(LEDGER_FILE),
            serde_json::to_string(sim.ledger().records())?,
        )?;

        let kept: Vec<Day> = sim.snapshots().days().collect();
        for day in &kept {
            if let Some(raw) = sim.snapshots().raw(*day) {
                fs::write(snapshot_path(&snap_dir, *day), raw)?;
            }
        }
        prune_stale_snapshots(&snap_dir, &kept)?;

        debug!(
            dir = %self.root.display(),
            day = sim.current_day(),
            snapshots = kept.len(),
            "run saved"
        );
        Ok(())
    }

    /// Read a saved run back. The canonical and initial states are
    /// validated; snapshot blobs are kept verbatim and parsed on restore.
    pub fn load(&self, config: SimConfig) -> Result<Simulation> {
        let raw = fs::read_to_string(self.root.join(STATE_FILE))?;
        let state: SimState = serde_json::from_str(&raw)?;
        state.validate()?;

        // Older saves may predate initial.json; fall back to the current
        // state so the run is still usable, just without a day-zero floor.
        let initial_path = self.root.join(INITIAL_FILE);
        let initial = if initial_path.is_file() {
            let initial: SimState = serde_json::from_str(&fs::read_to_string(initial_path)?)?;
            initial.validate()?;
            initial
        } else {
            state.clone()
        };

        let mut ledger = Ledger::new();
        let ledger_path = self.root.join(LEDGER_FILE);
        if ledger_path.is_file() {
            let records: Vec<DayResult> = serde_json::from_str(&fs::read_to_string(ledger_path)?)?;
            ledger.extend(records);
        }

        let mut snapshots = SnapshotStore::new();
        let snap_dir = self.root.join(SNAPSHOT_DIR);
        if snap_dir.is_dir() {
            for entry in fs::read_dir(&snap_dir)? {
                let path = entry?.path();
                if let Some(day) = snapshot_day(&path) {
                    snapshots.insert_serialized(day, fs::read_to_string(&path)?);
                }
            }
        }

        info!(
            dir = %self.root.display(),
            day = state.day,
            records = ledger.len(),
            snapshots = snapshots.len(),
            "run loaded"
        );
        Ok(Simulation::resume(config, initial, state, ledger, snapshots))
    }
}

fn snapshot_path(dir: &Path, day: Day) -> PathBuf {
    dir.join(format!("day_{day:06}.json"))
}

/// Parse the day out of a `day_NNNNNN.json` filename, ignoring anything
/// else that found its way into the directory.
fn snapshot_day(path: &Path) -> Option<Day> {
    if path.extension()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("day_")?.parse().ok()
}

fn prune_stale_snapshots(dir: &Path, kept: &[Day]) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if let Some(day) = snapshot_day(&path) {
            if !kept.contains(&day) {
                fs::remove_file(&path)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::service::{ServiceCategory, ServiceLine};
    use crate::chain::station::Station;
    use crate::chain::store::{Store, StoreStatus};
    use crate::core::types::ServiceId;

    fn demo_state() -> SimState {
        let mut state = SimState::new();
        let mut station = Station::new("ST01", "Demo Station");
        station.fuel_vehicles_per_day = 1000;
        station.visitor_vehicles_per_day = 0;
        station.traffic_volatility = 0.0;
        state.stations.insert(station.id.clone(), station);

        let mut store = Store::new("M1", "Demo", "ST01");
        store.status = StoreStatus::Open;
        store.service_lines.insert(
            ServiceId::new("WASH"),
            ServiceLine {
                id: ServiceId::new("WASH"),
                name: "Wash".into(),
                category: ServiceCategory::Wash,
                price: 30.0,
                conversion_from_fuel: 0.15,
                capacity_per_day: 200,
                ..Default::default()
            },
        );
        state.stores.insert(store.id.clone(), store);
        state
    }

    #[test]
    fn save_then_load_roundtrips_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut sim = Simulation::new(SimConfig::default(), demo_state());
        sim.simulate(4).unwrap();
        storage.save(&sim).unwrap();

        let loaded = storage.load(SimConfig::default()).unwrap();

        assert_eq!(loaded.current_day(), sim.current_day());
        assert_eq!(loaded.state().cash, sim.state().cash);
        assert_eq!(loaded.ledger().len(), 4);
        assert_eq!(loaded.snapshots().len(), 4);
        for day in 1..=4 {
            assert_eq!(loaded.snapshots().raw(day), sim.snapshots().raw(day));
        }
    }

    #[test]
    fn loaded_run_can_roll_back_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut sim = Simulation::new(SimConfig::default(), demo_state());
        sim.simulate(3).unwrap();
        storage.save(&sim).unwrap();

        let mut loaded = storage.load(SimConfig::default()).unwrap();
        loaded.rollback(3).unwrap();

        assert_eq!(loaded.current_day(), 1);
        assert_eq!(loaded.state().cash, demo_state().cash);
    }

    #[test]
    fn save_prunes_snapshots_dropped_by_rollback() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut sim = Simulation::new(SimConfig::default(), demo_state());
        sim.simulate(5).unwrap();
        storage.save(&sim).unwrap();

        sim.rollback(2).unwrap();
        storage.save(&sim).unwrap();

        let loaded = storage.load(SimConfig::default()).unwrap();
        assert_eq!(loaded.snapshots().len(), 3);
        assert!(loaded.snapshots().raw(4).is_none());
        assert!(loaded.snapshots().raw(5).is_none());
        assert!(!snapshot_path(&dir.path().join(SNAPSHOT_DIR), 5).exists());
    }

    #[test]
    fn exists_reflects_saved_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        assert!(!storage.exists());

        let sim = Simulation::new(SimConfig::default(), demo_state());
        storage.save(&sim).unwrap();
        assert!(storage.exists());
    }

    #[test]
    fn invalid_state_file_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join(STATE_FILE), "{\"day\": 0}").unwrap();

        assert!(storage.load(SimConfig::default()).is_err());
    }

    #[test]
    fn stray_files_in_snapshot_dir_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut sim = Simulation::new(SimConfig::default(), demo_state());
        sim.simulate(2).unwrap();
        storage.save(&sim).unwrap();
        fs::write(dir.path().join(SNAPSHOT_DIR).join("notes.txt"), "x").unwrap();

        let loaded = storage.load(SimConfig::default()).unwrap();
        assert_eq!(loaded.snapshots().len(), 2);
    }
}
