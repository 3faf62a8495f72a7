//! Domain model for the chain: stations, stores, service catalog,
//! payroll roles, and capital assets.

pub mod asset;
pub mod service;
pub mod staffing;
pub mod station;
pub mod store;

pub use asset::Asset;
pub use service::{ServiceCategory, ServiceLine, ServiceProject};
pub use staffing::{CommissionBasis, CommissionTerm, PendingHire, RolePlan, WorkforcePlan};
pub use station::Station;
pub use store::{MtdTrackers, OpexConfig, Store, StoreStatus};
