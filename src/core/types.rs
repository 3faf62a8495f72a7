//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulated day counter. Day 1 is the first day ever simulated.
pub type Day = u32;

/// Monetary amounts. All accounting is done in f64; determinism comes from
/// performing the same operations in the same order, not from fixed-point.
pub type Money = f64;

/// Identifier for a traffic-generating station (fuel forecourt).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationId(pub String);

/// Identifier for a service store bound to a station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreId(pub String);

/// Identifier for a sellable service line at a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(pub String);

/// Identifier for a maintenance project within a service line's mix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectId(pub String);

/// Identifier for a payroll role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub String);

/// Stock-keeping unit for consumables and parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sku(pub String);

macro_rules! impl_string_id {
    ($($t:ty),*) => {
        $(
            impl $t {
                pub fn new(id: impl Into<String>) -> Self {
                    Self(id.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl std::fmt::Display for $t {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $t {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }
        )*
    };
}

impl_string_id!(StationId, StoreId, ServiceId, ProjectId, RoleId, Sku);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_equality() {
        let a = StoreId::new("S001");
        let b = StoreId::new("S001");
        let c = StoreId::new("S002");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_id_map_key() {
        use std::collections::BTreeMap;
        let mut map: BTreeMap<Sku, f64> = BTreeMap::new();
        map.insert(Sku::new("CHEM"), 12.5);
        assert_eq!(map.get(&Sku::new("CHEM")), Some(&12.5));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(StationId::new("ST01").to_string(), "ST01");
        assert_eq!(RoleId::from("washer").as_str(), "washer");
    }

    #[test]
    fn test_ids_sort_stably() {
        let mut ids = vec![ServiceId::new("B"), ServiceId::new("A"), ServiceId::new("C")];
        ids.sort();
        assert_eq!(ids[0], ServiceId::new("A"));
        assert_eq!(ids[2], ServiceId::new("C"));
    }
}
