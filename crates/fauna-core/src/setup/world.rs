//! World Setup
//!
//! Builds the grid from config and scatters the initial food.

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::warn;

use crate::components::{FoodItem, GridCell};
use crate::config::{FoodConfig, SimulationConfig};
use crate::grid::{GridBounds, GridPosition, GridService, GridWorld, Nutrition};

use super::SpawnError;

/// Random placement attempts before falling back to a scan
const PLACEMENT_ATTEMPTS: u32 = 64;

/// Create the grid with its blocked terrain
pub fn create_grid(sim: &SimulationConfig) -> GridWorld {
    let mut grid = GridWorld::new(sim.grid_width, sim.grid_height).with_cell_size(sim.cell_size);
    for cell in sim.blocked_cells() {
        if grid.in_bounds(cell) {
            grid.block(cell);
        } else {
            warn!(%cell, "blocked tile outside the grid, ignoring");
        }
    }
    grid
}

/// A tile an animal or food item can be placed on
pub fn is_free(grid: &GridWorld, cell: GridPosition) -> bool {
    grid.is_valid(cell) && !grid.is_occupied(cell) && !grid.is_movement_blocked(cell)
}

/// Pick a random free tile inside `region`, skipping tiles inside `exclude`.
/// Falls back to the first free tile in row-major order.
pub fn random_free_cell<R: Rng + ?Sized>(
    grid: &GridWorld,
    region: GridBounds,
    exclude: Option<GridBounds>,
    rng: &mut R,
) -> Option<GridPosition> {
    let allowed = |cell: GridPosition| {
        region.contains(cell) && exclude.map_or(true, |e| !e.contains(cell)) && is_free(grid, cell)
    };

    for _ in 0..PLACEMENT_ATTEMPTS {
        let cell = GridPosition::new(
            rng.gen_range(region.min.x..=region.max.x),
            rng.gen_range(region.min.y..=region.max.y),
        );
        if allowed(cell) {
            return Some(cell);
        }
    }

    (region.min.y..=region.max.y)
        .flat_map(|y| (region.min.x..=region.max.x).map(move |x| GridPosition::new(x, y)))
        .find(|cell| allowed(*cell))
}

/// Spawn one food entity and register it with the grid
pub fn spawn_food(
    world: &mut World,
    food_type: &str,
    cell: GridPosition,
    nutrition: Option<Nutrition>,
) -> Result<Entity, SpawnError> {
    let entity = world.spawn((FoodItem::new(food_type), GridCell(cell))).id();
    let added = match world.get_resource_mut::<GridWorld>() {
        Some(mut grid) => grid.add_food(entity, food_type, cell, nutrition),
        None => {
            world.despawn(entity);
            return Err(SpawnError::MissingResource("GridWorld"));
        }
    };
    if !added {
        world.despawn(entity);
        return Err(SpawnError::FoodRejected(cell));
    }
    Ok(entity)
}

/// Scatter every configured food type inside `region`. Returns the number
/// of items placed.
pub fn scatter_food<R: Rng + ?Sized>(
    world: &mut World,
    foods: &[FoodConfig],
    region: GridBounds,
    rng: &mut R,
) -> usize {
    let mut placed = 0;
    for food in foods {
        let nutrition = food.base_nutrition.map(|base| Nutrition {
            base,
            potency: food.potency,
        });
        for _ in 0..food.count {
            let Some(cell) = world
                .get_resource::<GridWorld>()
                .and_then(|grid| random_free_cell(grid, region, None, &mut *rng))
            else {
                warn!(food_type = %food.name, "no free tile left for food");
                break;
            };
            match spawn_food(world, &food.name, cell, nutrition) {
                Ok(_) => placed += 1,
                Err(e) => warn!(food_type = %food.name, error = %e, "food not placed"),
            }
        }
    }
    placed
}
