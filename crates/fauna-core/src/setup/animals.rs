//! Animal Spawning
//!
//! Registers animals with the grid and the ECS world. An animal whose
//! definition does not validate is never created.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use fauna_events::{AnimalEvent, EventKind};

use crate::components::{GridCell, SimClock, SimSettings, SpeciesRegistry};
use crate::config::SpawnConfig;
use crate::controller::AnimalController;
use crate::definition::AnimalDefinition;
use crate::events::{EventSink, TickEvents};
use crate::grid::{GridBounds, GridPosition, GridService, GridWorld};

use super::world::random_free_cell;
use super::SpawnError;

/// Summary of spawned animals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnSummary {
    pub total_animals: usize,
    pub by_species: BTreeMap<String, usize>,
    pub failed: usize,
}

/// Spawn one animal on `cell`. With `seek_bounds` set the animal first walks
/// into that area before foraging or wandering.
pub fn spawn_animal<R: Rng + ?Sized>(
    world: &mut World,
    definition: Arc<AnimalDefinition>,
    cell: GridPosition,
    seek_bounds: Option<GridBounds>,
    rng: &mut R,
) -> Result<Entity, SpawnError> {
    let hunger_tick_interval = world
        .get_resource::<SimSettings>()
        .map(|s| s.hunger_tick_interval)
        .unwrap_or(1);
    let tick = world.get_resource::<SimClock>().map(|c| c.tick).unwrap_or(0);

    let entity = world.spawn_empty().id();
    let controller = match AnimalController::new(entity, definition.clone(), hunger_tick_interval, rng) {
        Ok(controller) => controller,
        Err(e) => {
            error!(species = %definition.species, error = %e, "invalid animal definition, not spawning");
            world.despawn(entity);
            return Err(e.into());
        }
    };

    let committed = match world.get_resource_mut::<GridWorld>() {
        Some(mut grid) => grid.commit_position(entity, cell),
        None => {
            world.despawn(entity);
            return Err(SpawnError::MissingResource("GridWorld"));
        }
    };
    if !committed {
        world.despawn(entity);
        return Err(SpawnError::CellUnavailable(cell));
    }

    let mut controller = match seek_bounds {
        Some(bounds) => controller.with_seek_bounds(bounds),
        None => controller,
    };
    controller.place(cell);
    world.entity_mut(entity).insert((controller, GridCell(cell)));

    if let Some(mut events) = world.get_resource_mut::<TickEvents>() {
        events.emit(AnimalEvent::new(
            tick,
            entity.to_bits(),
            definition.species.clone(),
            EventKind::Spawned { cell: cell.to_cell_ref() },
        ));
    }
    info!(species = %definition.species, agent = ?entity, %cell, "animal spawned");
    Ok(entity)
}

/// Look the species up in the registry and spawn it
pub fn spawn_species<R: Rng + ?Sized>(
    world: &mut World,
    species: &str,
    cell: GridPosition,
    seek_bounds: Option<GridBounds>,
    rng: &mut R,
) -> Result<Entity, SpawnError> {
    let definition = match world.get_resource::<SpeciesRegistry>() {
        Some(registry) => registry.get(species),
        None => return Err(SpawnError::MissingResource("SpeciesRegistry")),
    };
    match definition {
        Ok(definition) => spawn_animal(world, definition, cell, seek_bounds, rng),
        Err(e) => {
            error!(%species, error = %e, "cannot spawn species");
            Err(e.into())
        }
    }
}

/// Spawn every configured group at random free tiles. Edge spawns land in
/// the margin outside the view and walk in.
pub fn spawn_all_animals<R: Rng + ?Sized>(
    world: &mut World,
    spawns: &[SpawnConfig],
    rng: &mut R,
) -> SpawnSummary {
    let mut summary = SpawnSummary::default();
    let Some(grid_bounds) = world.get_resource::<GridWorld>().map(|g| g.bounds()) else {
        warn!("no grid, nothing spawned");
        return summary;
    };
    let view = world
        .get_resource::<SimSettings>()
        .map(|s| s.view_bounds)
        .unwrap_or(grid_bounds);

    for spawn in spawns {
        let edge = spawn.from_edge && view != grid_bounds;
        if spawn.from_edge && !edge {
            warn!(species = %spawn.species, "no margin outside the view, spawning inside");
        }

        for _ in 0..spawn.count {
            let cell = world.get_resource::<GridWorld>().and_then(|grid| {
                if edge {
                    random_free_cell(grid, grid_bounds, Some(view), &mut *rng)
                } else {
                    random_free_cell(grid, view, None, &mut *rng)
                }
            });
            let Some(cell) = cell else {
                warn!(species = %spawn.species, "no free tile left");
                summary.failed += 1;
                continue;
            };

            let seek = edge.then_some(view);
            match spawn_species(world, &spawn.species, cell, seek, rng) {
                Ok(_) => {
                    summary.total_animals += 1;
                    *summary.by_species.entry(spawn.species.clone()).or_insert(0) += 1;
                }
                Err(_) => summary.failed += 1,
            }
        }
    }
    summary
}
