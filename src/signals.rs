//! Registry of known traffic signals (waypoints)
//!
//! The registry is built once at startup, either from the built-in Vadodara table
//! or from the `[[signals]]` entries of the config file, and never changes after.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Manually verified signal coordinates, shared with the route control panel.
/// Ids are assigned 1..=N in alphabetical order of name, matching the producers.
const KNOWN_SIGNALS: &[(&str, f64, f64)] = &[
    ("Chakli Circle", 22.308333, 73.165278),
    ("Diwalipura Circle", 22.301806, 73.165500),
    ("Elora T-Junction", 22.315333, 73.161444),
    ("Genda Circle (Natubhai Circle)", 22.309944, 73.158667),
    ("Gotri Circle", 22.315556, 73.138000),
    ("Hari Nagar Char Rasta", 22.311278, 73.153167),
    ("ISKCON Circle", 22.303361, 73.151833),
    ("Manisha Circle", 22.296306, 73.164583),
    ("Nilamber Circle", 22.302000, 73.138944),
    ("Tandalja SP T-Junction (Natubhai Circle)", 22.280444, 73.153194),
];

/// A named point of interest with a stable identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Waypoint {
    pub fn new(id: u32, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Immutable id -> waypoint lookup table
#[derive(Debug, Clone)]
pub struct WaypointRegistry {
    by_id: HashMap<u32, Waypoint>,
    // Table order, for listing
    order: Vec<u32>,
}

impl WaypointRegistry {
    /// Build a registry, rejecting duplicate or zero ids and invalid coordinates
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(waypoints.len());
        let mut order = Vec::with_capacity(waypoints.len());
        let mut names = HashSet::new();

        for waypoint in waypoints {
            if waypoint.id == 0 {
                bail!("Signal '{}' has id 0; ids must be positive", waypoint.name);
            }
            if !valid_latitude(waypoint.latitude) || !valid_longitude(waypoint.longitude) {
                bail!(
                    "Signal {} '{}' has invalid coordinates ({}, {})",
                    waypoint.id,
                    waypoint.name,
                    waypoint.latitude,
                    waypoint.longitude
                );
            }
            if by_id.contains_key(&waypoint.id) {
                bail!("Duplicate signal id {}", waypoint.id);
            }
            // Episodes are keyed by name, so two signals sharing one would merge
            if !names.insert(waypoint.name.clone()) {
                warn!(
                    "Signal name '{}' is used by more than one id; alerts for them share state",
                    waypoint.name
                );
            }

            order.push(waypoint.id);
            by_id.insert(waypoint.id, waypoint);
        }

        Ok(Self { by_id, order })
    }

    /// The built-in Vadodara signal table
    pub fn builtin() -> Self {
        let mut names: Vec<&(&str, f64, f64)> = KNOWN_SIGNALS.iter().collect();
        names.sort_by(|a, b| a.0.cmp(b.0));

        let mut by_id = HashMap::with_capacity(names.len());
        let mut order = Vec::with_capacity(names.len());
        for (index, (name, lat, lon)) in names.into_iter().enumerate() {
            let id = index as u32 + 1;
            order.push(id);
            by_id.insert(id, Waypoint::new(id, *name, *lat, *lon));
        }

        Self { by_id, order }
    }

    pub fn lookup(&self, id: u32) -> Option<&Waypoint> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Waypoints in table order
    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}

pub(crate) fn valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

pub(crate) fn valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_ids_follow_alphabetical_order() {
        let registry = WaypointRegistry::builtin();
        assert_eq!(registry.len(), 10);

        let gotri = registry.lookup(5).unwrap();
        assert_eq!(gotri.name, "Gotri Circle");
        assert_eq!(gotri.latitude, 22.315556);
        assert_eq!(gotri.longitude, 73.138000);

        assert_eq!(registry.lookup(1).unwrap().name, "Chakli Circle");
        assert_eq!(
            registry.lookup(10).unwrap().name,
            "Tandalja SP T-Junction (Natubhai Circle)"
        );
    }

    #[test]
    fn test_unknown_id_is_none() {
        let registry = WaypointRegistry::builtin();
        assert!(registry.lookup(0).is_none());
        assert!(registry.lookup(11).is_none());
        assert!(registry.lookup(999).is_none());
    }

    #[test]
    fn test_iter_keeps_table_order() {
        let registry = WaypointRegistry::new(vec![
            Waypoint::new(7, "Seven", 1.0, 1.0),
            Waypoint::new(2, "Two", 2.0, 2.0),
            Waypoint::new(9, "Nine", 3.0, 3.0),
        ])
        .unwrap();

        let ids: Vec<u32> = registry.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![7, 2, 9]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = WaypointRegistry::new(vec![
            Waypoint::new(1, "A", 1.0, 1.0),
            Waypoint::new(1, "B", 2.0, 2.0),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_id_rejected() {
        let result = WaypointRegistry::new(vec![Waypoint::new(0, "Zero", 1.0, 1.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        assert!(WaypointRegistry::new(vec![Waypoint::new(1, "A", 91.0, 0.0)]).is_err());
        assert!(WaypointRegistry::new(vec![Waypoint::new(1, "A", 0.0, -180.5)]).is_err());
        assert!(WaypointRegistry::new(vec![Waypoint::new(1, "A", f64::NAN, 0.0)]).is_err());
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let registry = WaypointRegistry::new(vec![
            Waypoint::new(1, "Same", 1.0, 1.0),
            Waypoint::new(2, "Same", 2.0, 2.0),
        ])
        .unwrap();
        assert_eq!(registry.len(), 2);
    }
}
