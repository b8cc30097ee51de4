//! Grid Services
//!
//! The capabilities an animal needs from the world around it: tile queries,
//! occupancy, path requests and a view of edible objects. Agents only ever
//! see these traits; [`GridWorld`] is the in-process implementation the
//! simulation runs on.

pub mod pathfinding;
pub mod position;
pub mod world;

use bevy_ecs::entity::Entity;
use serde::{Deserialize, Serialize};

pub use position::{GridBounds, GridPosition};
pub use world::GridWorld;

/// Scalable nutrition carried by some food items
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub base: f32,
    pub potency: f32,
}

impl Nutrition {
    pub fn value(&self) -> f32 {
        self.base * self.potency
    }
}

/// Snapshot of a food object that still exists
#[derive(Debug, Clone, PartialEq)]
pub struct FoodView {
    pub entity: Entity,
    pub food_type: String,
    pub cell: GridPosition,
    pub nutrition: Option<Nutrition>,
}

/// Tile, occupancy and path queries plus position commits
pub trait GridService {
    /// In bounds and not permanently blocked terrain.
    fn is_valid(&self, cell: GridPosition) -> bool;

    /// Another agent stands on the tile.
    fn is_occupied(&self, cell: GridPosition) -> bool;

    /// Something on the tile stops agents from walking onto it.
    fn is_movement_blocked(&self, cell: GridPosition) -> bool;

    fn entities_at(&self, cell: GridPosition) -> Vec<Entity>;

    /// Entities within `radius` of `center`, in row-major cell order.
    /// `use_circle` selects `dx²+dy² <= r²`, otherwise Manhattan distance.
    fn entities_in_radius(&self, center: GridPosition, radius: i32, use_circle: bool) -> Vec<Entity>;

    /// Cells from `from` to `to`, excluding `from`. Empty if unreachable.
    fn shortest_path(&self, from: GridPosition, to: GridPosition) -> Vec<GridPosition>;

    fn position_of(&self, entity: Entity) -> Option<GridPosition>;

    /// Move (or place) an agent. Returns false if the tile cannot take it.
    fn commit_position(&mut self, entity: Entity, cell: GridPosition) -> bool;

    /// Remove an agent from the occupancy index.
    fn release(&mut self, entity: Entity);

    fn world_to_grid(&self, world: (f32, f32)) -> GridPosition;

    fn grid_to_world(&self, cell: GridPosition) -> (f32, f32);
}

/// Weakly referenced food objects
pub trait FoodWorld {
    /// `None` once the food has been eaten or otherwise removed.
    fn food(&self, entity: Entity) -> Option<FoodView>;

    /// Returns false if the food was already gone.
    fn remove_food(&mut self, entity: Entity) -> bool;
}
