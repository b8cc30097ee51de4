//! ECS Systems
//!
//! The per-tick pipeline: advance the clock, apply interventions, tick every
//! animal, mirror positions, spawn and expire droppings, despawn what is
//! gone.

pub mod animals;
pub mod lifecycle;

use bevy_ecs::prelude::*;

use fauna_events::AnimalEvent;

use crate::components::SimClock;
use crate::events::TickEvents;
use crate::interventions::apply_interventions;

pub use animals::{sync_grid_positions, tick_animals};
pub use lifecycle::{despawn_removed, expire_droppings, spawn_droppings};

/// System to advance the simulation clock
pub fn advance_clock(mut clock: ResMut<SimClock>) {
    clock.advance();
}

/// Build the chained per-tick schedule
pub fn build_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            advance_clock,
            apply_interventions,
            tick_animals,
            sync_grid_positions,
            spawn_droppings,
            expire_droppings,
            despawn_removed,
        )
            .chain(),
    );
    schedule
}

/// Run one tick and return the events it produced, in emission order.
/// Events queued before the tick (spawns) are returned too.
pub fn step(world: &mut World, schedule: &mut Schedule) -> Vec<AnimalEvent> {
    schedule.run(world);
    world
        .get_resource_mut::<TickEvents>()
        .map(|mut events| events.drain())
        .unwrap_or_default()
}
