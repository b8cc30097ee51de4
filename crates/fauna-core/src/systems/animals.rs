//! Animal Systems
//!
//! Drives every animal controller once per tick and mirrors grid positions
//! onto the ECS.

use bevy_ecs::prelude::*;

use crate::components::{GridCell, SimClock};
use crate::controller::{AgentContext, AnimalController};
use crate::events::TickEvents;
use crate::grid::GridWorld;
use crate::SimRng;

/// System to run one tick of every animal, in entity order
pub fn tick_animals(
    clock: Res<SimClock>,
    mut grid: ResMut<GridWorld>,
    mut rng: ResMut<SimRng>,
    mut events: ResMut<TickEvents>,
    mut animals: Query<(Entity, &mut AnimalController)>,
) {
    let mut order: Vec<Entity> = animals.iter().map(|(entity, _)| entity).collect();
    order.sort_unstable();

    let grid: &mut GridWorld = &mut grid;
    let events: &mut TickEvents = &mut events;
    let rng = &mut rng.0;
    for entity in order {
        if let Ok((_, mut controller)) = animals.get_mut(entity) {
            let mut ctx = AgentContext::new(clock.tick, &mut *rng, &mut *events);
            controller.on_tick(&mut *grid, &mut ctx);
        }
    }
}

/// System to copy each controller's tile onto its `GridCell`
pub fn sync_grid_positions(mut animals: Query<(&AnimalController, &mut GridCell)>) {
    for (controller, mut cell) in animals.iter_mut() {
        if cell.0 != controller.cell() {
            cell.0 = controller.cell();
        }
    }
}
