//! Read-side reports over the chain.

pub mod breakeven;

pub use breakeven::{breakeven_for_store, BreakevenReport};
