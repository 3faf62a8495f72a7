//! Forecourt - Deterministic Service-Chain Economics Simulator

pub mod chain;
pub mod core;
pub mod engine;
pub mod events;
pub mod inventory;
pub mod presets;
pub mod report;
pub mod sim;
