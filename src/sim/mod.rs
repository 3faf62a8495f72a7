//! Run orchestration: canonical state, day records, snapshots, the
//! command surface, scenario comparison, and on-disk persistence.

pub mod ledger;
pub mod runner;
pub mod scenario;
pub mod snapshot;
pub mod state;
pub mod storage;

pub use ledger::{DayResult, DayStoreResult, Ledger};
pub use runner::Simulation;
pub use scenario::{
    compare_scenarios, MetricsDelta, Scenario, ScenarioComparison, ScenarioMetrics,
    ScenarioOutcome, StationPatch, StorePatch,
};
pub use snapshot::SnapshotStore;
pub use state::SimState;
pub use storage::Storage;
