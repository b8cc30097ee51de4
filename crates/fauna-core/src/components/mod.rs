//! ECS Components
//!
//! Components and resources hosting the simulation inside bevy_ecs.

pub mod world;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::GridPosition;

pub use world::{EffectRegistry, SimClock, SimSettings, SpeciesRegistry};

/// Component: the tile an entity currently stands on
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell(pub GridPosition);

/// Component: an edible item registered with the grid
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub food_type: String,
}

impl FoodItem {
    pub fn new(food_type: impl Into<String>) -> Self {
        Self {
            food_type: food_type.into(),
        }
    }
}

/// Component: a dropping left behind by an animal
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poop {
    pub variant: u32,
    /// Entity bits of the animal that left it
    pub owner: u64,
    pub dropped_at: u64,
    /// Tick on which the dropping is cleared away
    pub expires_at: u64,
}
