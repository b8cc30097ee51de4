//! World Resources
//!
//! Clock, settings and the shared definition registries.

use bevy_ecs::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::definition::{AnimalDefinition, DefinitionError, SpeciesLibrary};
use crate::grid::GridBounds;
use crate::status::StatusEffectDefinition;

/// Resource: the simulation clock
#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    /// Current simulation tick, 0 before the first tick runs
    pub tick: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }
}

/// Resource: settings shared by every agent
#[derive(Resource, Debug, Clone)]
pub struct SimSettings {
    pub hunger_tick_interval: u32,
    /// Visible area; animals spawned outside it walk in
    pub view_bounds: GridBounds,
    pub dropping_lifetime_ticks: u64,
}

/// Resource: resolved species definitions
#[derive(Resource, Debug, Clone, Default)]
pub struct SpeciesRegistry(pub SpeciesLibrary);

impl SpeciesRegistry {
    pub fn get(&self, species: &str) -> Result<Arc<AnimalDefinition>, DefinitionError> {
        self.0.get(species)
    }
}

/// Resource: status effect definitions by id
#[derive(Resource, Debug, Clone, Default)]
pub struct EffectRegistry {
    effects: HashMap<String, Arc<StatusEffectDefinition>>,
}

impl EffectRegistry {
    pub fn new(definitions: impl IntoIterator<Item = StatusEffectDefinition>) -> Self {
        Self {
            effects: definitions
                .into_iter()
                .map(|d| (d.id.clone(), Arc::new(d)))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<StatusEffectDefinition>> {
        self.effects.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
