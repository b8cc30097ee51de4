//! Snapshot Types
//!
//! Serialization structs for periodic population summaries.
//!
//! A snapshot captures every live animal and the remaining food at one tick,
//! used by the CLI's summary output and by tests that compare runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::CellRef;

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// One animal's observable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalSnapshot {
    pub agent: u64,
    pub species: String,
    pub cell: CellRef,
    pub health: f32,
    pub max_health: f32,
    pub hunger: f32,
    pub max_hunger: f32,
    /// Current action: idle, eating, pooping or dying
    pub action: String,
    #[serde(default)]
    pub has_target: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
}

impl AnimalSnapshot {
    pub fn is_starving(&self) -> bool {
        self.hunger >= self.max_hunger
    }

    pub fn is_dying(&self) -> bool {
        self.action == "dying"
    }
}

/// Whole-population snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub snapshot_id: String,
    pub tick: u64,
    pub animals: Vec<AnimalSnapshot>,
    #[serde(default)]
    pub food_remaining: usize,
    #[serde(default)]
    pub droppings: usize,
}

impl PopulationSnapshot {
    pub fn new(snapshot_id: impl Into<String>, tick: u64) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            tick,
            animals: Vec::new(),
            food_remaining: 0,
            droppings: 0,
        }
    }

    /// Animals that are not fading out.
    pub fn alive_count(&self) -> usize {
        self.animals.iter().filter(|a| !a.is_dying()).count()
    }

    pub fn starving_count(&self) -> usize {
        self.animals.iter().filter(|a| a.is_starving()).count()
    }

    /// Head count per species, sorted by species name.
    pub fn species_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for animal in &self.animals {
            *counts.entry(animal.species.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn find_animal(&self, agent: u64) -> Option<&AnimalSnapshot> {
        self.animals.iter().find(|a| a.agent == agent)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animal(agent: u64, species: &str, hunger: f32, action: &str) -> AnimalSnapshot {
        AnimalSnapshot {
            agent,
            species: species.to_string(),
            cell: CellRef::new(0, 0),
            health: 10.0,
            max_health: 10.0,
            hunger,
            max_hunger: 100.0,
            action: action.to_string(),
            has_target: false,
            effects: Vec::new(),
        }
    }

    #[test]
    fn test_generate_snapshot_id() {
        assert_eq!(generate_snapshot_id(1), "snap_000001");
        assert_eq!(generate_snapshot_id(123456), "snap_123456");
    }

    #[test]
    fn test_population_counts() {
        let mut snapshot = PopulationSnapshot::new("snap_000001", 40);
        snapshot.animals.push(animal(1, "rabbit", 100.0, "idle"));
        snapshot.animals.push(animal(2, "rabbit", 20.0, "eating"));
        snapshot.animals.push(animal(3, "deer", 50.0, "dying"));

        assert_eq!(snapshot.alive_count(), 2);
        assert_eq!(snapshot.starving_count(), 1);

        let counts = snapshot.species_counts();
        assert_eq!(counts.get("rabbit"), Some(&2));
        assert_eq!(counts.get("deer"), Some(&1));
        assert_eq!(snapshot.find_animal(3).map(|a| a.species.as_str()), Some("deer"));
        assert!(snapshot.find_animal(9).is_none());
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut snapshot = PopulationSnapshot::new("snap_000002", 80);
        snapshot.food_remaining = 4;
        snapshot.animals.push(animal(1, "rabbit", 12.5, "idle"));

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"food_remaining\":4"));
        // empty effects are omitted
        assert!(!json.contains("effects"));

        let parsed = PopulationSnapshot::from_json(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
