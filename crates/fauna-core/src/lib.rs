//! Fauna Simulation Engine Library
//!
//! Tile-grid animal agents: needs, eating, pooping, foraging movement and
//! death, hosted in a bevy_ecs world and driven by a fixed tick.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod behavior;
pub mod components;
pub mod config;
pub mod controller;
pub mod definition;
pub mod events;
pub mod grid;
pub mod interventions;
pub mod movement;
pub mod needs;
pub mod output;
pub mod setup;
pub mod status;
pub mod systems;

pub use components::*;
pub use config::{ConfigError, FaunaConfig};
pub use controller::{AgentContext, AnimalController, LifeState};
pub use definition::{AnimalDefinition, DefinitionError, Diet, SpeciesLibrary};
pub use grid::{GridPosition, GridWorld};
pub use setup::{create_world, SpawnError};
pub use systems::{build_schedule, step};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
