//! World Setup
//!
//! Builds a ready-to-run ECS world from configuration: resources, terrain,
//! food and animals.

pub mod animals;
pub mod world;

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::info;

use crate::components::{EffectRegistry, SimClock, SimSettings, SpeciesRegistry};
use crate::config::{ConfigError, FaunaConfig};
use crate::definition::DefinitionError;
use crate::events::TickEvents;
use crate::grid::GridPosition;
use crate::SimRng;

pub use animals::*;
pub use world::*;

/// Errors placing entities into the world
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("tile {0} cannot take an animal")]
    CellUnavailable(GridPosition),

    #[error("tile {0} cannot hold food")]
    FoodRejected(GridPosition),

    #[error("missing world resource {0}")]
    MissingResource(&'static str),
}

/// Insert every resource the schedule needs, then scatter food and spawn
/// animals.
pub fn create_world(config: &FaunaConfig) -> Result<World, ConfigError> {
    let sim = &config.simulation;
    let library = config.species_library()?;
    for (species, reason) in library.rejected() {
        tracing::error!(%species, error = %reason, "species definition rejected");
    }

    let mut world = World::new();
    world.insert_resource(SimClock::new());
    world.insert_resource(SimRng(SmallRng::seed_from_u64(sim.seed)));
    world.insert_resource(SimSettings {
        hunger_tick_interval: sim.hunger_tick_interval,
        view_bounds: sim.view_bounds(),
        dropping_lifetime_ticks: sim.dropping_lifetime_ticks,
    });
    world.insert_resource(SpeciesRegistry(library));
    world.insert_resource(EffectRegistry::new(config.status_effects.iter().cloned()));
    world.insert_resource(create_grid(sim));
    world.insert_resource(TickEvents::new());

    // Take the RNG out to avoid borrow conflicts
    if let Some(mut sim_rng) = world.remove_resource::<SimRng>() {
        let view = sim.view_bounds();
        let food = scatter_food(&mut world, &config.foods, view, &mut sim_rng.0);
        let summary = spawn_all_animals(&mut world, &config.spawns, &mut sim_rng.0);
        info!(food, animals = summary.total_animals, failed = summary.failed, "world populated");
        world.insert_resource(sim_rng);
    }

    Ok(world)
}
