//! Shared fixtures for integration tests

#![allow(dead_code)]

use bevy_ecs::entity::Entity;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;

use fauna_core::definition::{AnimalDefinition, Diet, DietPreference};
use fauna_core::events::AnimalEvent;
use fauna_core::grid::{GridPosition, GridService, GridWorld};
use fauna_core::{AgentContext, AnimalController, LifeState};

/// Hunger interval long enough that hunger never rises on its own
pub const FROZEN_HUNGER: u32 = 10_000;

pub fn herbivore() -> Diet {
    Diet {
        name: "herbivore".to_string(),
        max_hunger: 100.0,
        hunger_increase_rate: 1.0,
        hunger_threshold: 50.0,
        foods: vec![
            DietPreference {
                food_type: "carrot".to_string(),
                satiation: 40.0,
                priority: 2.0,
            },
            DietPreference {
                food_type: "grass".to_string(),
                satiation: 10.0,
                priority: 1.0,
            },
        ],
    }
}

pub fn rabbit() -> AnimalDefinition {
    AnimalDefinition {
        species: "rabbit".to_string(),
        movement_speed: 1.0,
        wander_pause_tick_chance: 0,
        ..AnimalDefinition::default()
    }
    .with_diet(herbivore())
}

/// A grid, an RNG and an event sink driving controllers by hand
pub struct Harness {
    pub grid: GridWorld,
    pub rng: SmallRng,
    pub events: Vec<AnimalEvent>,
    pub tick: u64,
}

impl Harness {
    pub fn new(width: i32, height: i32, seed: u64) -> Self {
        Self {
            grid: GridWorld::new(width, height),
            rng: SmallRng::seed_from_u64(seed),
            events: Vec::new(),
            tick: 0,
        }
    }

    pub fn spawn(
        &mut self,
        id: u32,
        definition: AnimalDefinition,
        cell: GridPosition,
        hunger_tick_interval: u32,
    ) -> AnimalController {
        let entity = Entity::from_raw(id);
        let mut controller =
            AnimalController::new(entity, Arc::new(definition), hunger_tick_interval, &mut self.rng).unwrap();
        assert!(self.grid.commit_position(entity, cell));
        controller.place(cell);
        controller
    }

    pub fn tick(&mut self, controller: &mut AnimalController) -> LifeState {
        self.tick += 1;
        let mut ctx = AgentContext::new(self.tick, &mut self.rng, &mut self.events);
        controller.on_tick(&mut self.grid, &mut ctx)
    }

    pub fn position(&self, controller: &AnimalController) -> Option<GridPosition> {
        self.grid.position_of(controller.entity())
    }

    /// Events emitted on `tick`
    pub fn events_at(&self, tick: u64) -> Vec<&AnimalEvent> {
        self.events.iter().filter(|e| e.tick == tick).collect()
    }
}
