//! Statistics Output
//!
//! Collects and outputs simulation statistics for analysis.

use bevy_ecs::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use fauna_events::{AnimalEvent, EventKind};

/// Statistics for a single species
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpeciesStats {
    pub spawned: usize,
    pub meals: usize,
    pub hunger_removed: f32,
    pub droppings: usize,
    pub deaths: usize,
    pub deaths_by_cause: BTreeMap<String, usize>,
}

/// Overall simulation statistics
#[derive(Debug, Clone, Serialize)]
pub struct SimulationStats {
    pub total_ticks: u64,
    pub total_events: usize,
    pub events_by_type: BTreeMap<String, usize>,
    pub average_events_per_tick: f64,
    pub species: BTreeMap<String, SpeciesStats>,
    pub tick_history: Vec<TickSummary>,
}

/// Summary of a tick for history
#[derive(Debug, Clone, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub event_count: usize,
}

/// Resource to accumulate statistics during simulation
#[derive(Resource, Debug, Default)]
pub struct StatsCollector {
    pub total_events: usize,
    pub events_by_type: BTreeMap<String, usize>,
    pub species: BTreeMap<String, SpeciesStats>,
    pub tick_history: Vec<TickSummary>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record events from a tick
    pub fn record_tick(&mut self, tick: u64, events: &[AnimalEvent]) {
        for event in events {
            self.total_events += 1;

            let type_name = format!("{:?}", event.event_type()).to_lowercase();
            *self.events_by_type.entry(type_name).or_insert(0) += 1;

            let stats = self.species.entry(event.species.clone()).or_default();
            match &event.kind {
                EventKind::Spawned { .. } => stats.spawned += 1,
                EventKind::FinishedEating { satiation, .. } => {
                    stats.meals += 1;
                    stats.hunger_removed += satiation;
                }
                EventKind::Pooped { .. } => stats.droppings += 1,
                EventKind::Died { cause, .. } => {
                    stats.deaths += 1;
                    *stats.deaths_by_cause.entry(cause.to_string()).or_insert(0) += 1;
                }
                _ => {}
            }
        }

        if !events.is_empty() {
            self.tick_history.push(TickSummary {
                tick,
                event_count: events.len(),
            });
        }
    }

    /// Generate final statistics
    pub fn generate_stats(&self, total_ticks: u64) -> SimulationStats {
        let average_events_per_tick = if total_ticks > 0 {
            self.total_events as f64 / total_ticks as f64
        } else {
            0.0
        };

        SimulationStats {
            total_ticks,
            total_events: self.total_events,
            events_by_type: self.events_by_type.clone(),
            average_events_per_tick,
            species: self.species.clone(),
            tick_history: self.tick_history.clone(),
        }
    }
}

/// Write statistics as pretty JSON
pub fn write_stats(stats: &SimulationStats, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }

    let json = serde_json::to_string_pretty(stats)?;
    fs::write(path, json)?;
    Ok(())
}
