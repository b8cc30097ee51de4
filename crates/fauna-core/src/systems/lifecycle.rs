//! Lifecycle Systems
//!
//! Spawns droppings reported this tick, clears them once they expire and
//! despawns whatever the grid no longer tracks.

use bevy_ecs::prelude::*;
use tracing::debug;

use fauna_events::EventKind;

use crate::components::{GridCell, Poop, SimClock, SimSettings};
use crate::controller::AnimalController;
use crate::events::TickEvents;
use crate::grid::{GridPosition, GridWorld};

/// System to spawn a `Poop` entity for every Pooped event of this tick
pub fn spawn_droppings(
    mut commands: Commands,
    clock: Res<SimClock>,
    settings: Res<SimSettings>,
    events: Res<TickEvents>,
) {
    for event in events.events.iter().filter(|e| e.tick == clock.tick) {
        if let EventKind::Pooped { cell, variant } = &event.kind {
            commands.spawn((
                Poop {
                    variant: *variant,
                    owner: event.agent,
                    dropped_at: event.tick,
                    expires_at: event.tick + settings.dropping_lifetime_ticks,
                },
                GridCell(GridPosition::new(cell.x, cell.y)),
            ));
        }
    }
}

/// System to clear droppings whose lifetime has run out
pub fn expire_droppings(mut commands: Commands, clock: Res<SimClock>, droppings: Query<(Entity, &Poop)>) {
    for (entity, poop) in droppings.iter() {
        if clock.tick >= poop.expires_at {
            debug!(owner = poop.owner, dropped_at = poop.dropped_at, "dropping cleared");
            commands.entity(entity).despawn();
        }
    }
}

/// System to despawn removed animals and eaten food
pub fn despawn_removed(
    mut commands: Commands,
    mut grid: ResMut<GridWorld>,
    animals: Query<(Entity, &AnimalController)>,
) {
    for (entity, controller) in animals.iter() {
        if controller.is_removed() {
            debug!(agent = ?entity, "despawning removed animal");
            commands.entity(entity).despawn();
        }
    }
    for food in grid.drain_removed_food() {
        if let Some(mut entity) = commands.get_entity(food) {
            entity.despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::FoodItem;
    use crate::events::EventSink;
    use crate::grid::{FoodWorld, GridBounds};
    use fauna_events::{AnimalEvent, CellRef};

    fn settings(dropping_lifetime_ticks: u64) -> SimSettings {
        SimSettings {
            hunger_tick_interval: 1,
            view_bounds: GridBounds::from_size(4, 4),
            dropping_lifetime_ticks,
        }
    }

    #[test]
    fn test_droppings_spawn_for_current_tick_only() {
        let mut world = World::new();
        world.insert_resource(SimClock { tick: 5 });
        world.insert_resource(settings(30));
        let mut events = TickEvents::new();
        events.emit(AnimalEvent::new(
            4,
            1,
            "rabbit",
            EventKind::Pooped {
                cell: CellRef::new(1, 1),
                variant: 0,
            },
        ));
        events.emit(AnimalEvent::new(
            5,
            2,
            "rabbit",
            EventKind::Pooped {
                cell: CellRef::new(3, 2),
                variant: 2,
            },
        ));
        world.insert_resource(events);

        let mut schedule = Schedule::default();
        schedule.add_systems(spawn_droppings);
        schedule.run(&mut world);

        let mut query = world.query::<(&Poop, &GridCell)>();
        let droppings: Vec<_> = query.iter(&world).collect();
        assert_eq!(droppings.len(), 1);
        assert_eq!(droppings[0].0.variant, 2);
        assert_eq!(droppings[0].0.owner, 2);
        assert_eq!(droppings[0].0.expires_at, 35);
        assert_eq!(droppings[0].1 .0, GridPosition::new(3, 2));
    }

    #[test]
    fn test_droppings_expire() {
        let mut world = World::new();
        world.insert_resource(SimClock { tick: 9 });
        let fresh = world
            .spawn(Poop {
                variant: 0,
                owner: 1,
                dropped_at: 5,
                expires_at: 10,
            })
            .id();
        let stale = world
            .spawn(Poop {
                variant: 1,
                owner: 1,
                dropped_at: 1,
                expires_at: 9,
            })
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(expire_droppings);
        schedule.run(&mut world);
        assert!(world.get_entity(stale).is_none());
        assert!(world.get_entity(fresh).is_some());

        world.resource_mut::<SimClock>().advance();
        schedule.run(&mut world);
        assert!(world.get_entity(fresh).is_none());
    }

    #[test]
    fn test_eaten_food_is_despawned() {
        let mut world = World::new();
        let food = world.spawn(FoodItem::new("carrot")).id();
        let mut grid = GridWorld::new(4, 4);
        assert!(grid.add_food(food, "carrot", GridPosition::new(1, 1), None));
        assert!(grid.remove_food(food));
        world.insert_resource(grid);

        let mut schedule = Schedule::default();
        schedule.add_systems(despawn_removed);
        schedule.run(&mut world);

        assert!(world.get_entity(food).is_none());
        assert!(world.resource_mut::<GridWorld>().drain_removed_food().is_empty());
    }
}
