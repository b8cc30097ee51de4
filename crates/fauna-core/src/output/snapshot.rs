//! Snapshot Generation
//!
//! Captures the observable state of every animal at regular intervals.

use bevy_ecs::prelude::*;
use std::fs;
use std::path::Path;

use fauna_events::{generate_snapshot_id, PopulationSnapshot};

use crate::components::{Poop, SimClock};
use crate::controller::AnimalController;
use crate::grid::GridWorld;

/// Resource to track snapshot generation
#[derive(Resource, Debug)]
pub struct SnapshotGenerator {
    next_snapshot_id: u64,
    snapshot_interval: u64,
    last_snapshot_tick: u64,
}

impl SnapshotGenerator {
    pub fn new(snapshot_interval: u64) -> Self {
        Self {
            next_snapshot_id: 1,
            snapshot_interval,
            last_snapshot_tick: 0,
        }
    }

    /// An interval of 0 disables periodic snapshots.
    pub fn should_snapshot(&self, current_tick: u64) -> bool {
        self.snapshot_interval > 0
            && current_tick > self.last_snapshot_tick
            && current_tick % self.snapshot_interval == 0
    }

    pub fn next_id(&mut self) -> String {
        let id = generate_snapshot_id(self.next_snapshot_id);
        self.next_snapshot_id += 1;
        id
    }

    pub fn mark_snapshot(&mut self, tick: u64) {
        self.last_snapshot_tick = tick;
    }

    pub fn snapshot_count(&self) -> u64 {
        self.next_snapshot_id - 1
    }
}

/// Capture every animal that has not been removed, ordered by entity.
pub fn generate_snapshot(world: &mut World, snapshot_id: impl Into<String>) -> PopulationSnapshot {
    let tick = world.get_resource::<SimClock>().map(|c| c.tick).unwrap_or(0);
    let mut snapshot = PopulationSnapshot::new(snapshot_id, tick);

    let mut animals: Vec<_> = world
        .query::<&AnimalController>()
        .iter(world)
        .filter(|c| !c.is_removed())
        .map(|c| c.snapshot())
        .collect();
    animals.sort_by_key(|a| a.agent);
    snapshot.animals = animals;

    snapshot.droppings = world.query::<&Poop>().iter(world).count();
    snapshot.food_remaining = world
        .get_resource::<GridWorld>()
        .map(|g| g.food_count())
        .unwrap_or(0);
    snapshot
}

/// Generate a snapshot using the generator's next id.
pub fn take_snapshot(world: &mut World) -> PopulationSnapshot {
    let id = match world.get_resource_mut::<SnapshotGenerator>() {
        Some(mut generator) => generator.next_id(),
        None => generate_snapshot_id(0),
    };
    generate_snapshot(world, id)
}

/// Write a snapshot to `<dir>/<snapshot_id>.json`
pub fn write_snapshot_to_dir(snapshot: &PopulationSnapshot, dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(format!("{}.json", snapshot.snapshot_id));
    fs::write(path, snapshot.to_json_pretty()?)?;
    Ok(())
}
