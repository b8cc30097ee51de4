//! End-to-end agent scenarios
//!
//! Drives single animals tick by tick against a real grid.

mod common;

use bevy_ecs::entity::Entity;
use std::sync::Arc;

use common::{rabbit, Harness, FROZEN_HUNGER};
use fauna_core::behavior::ActionState;
use fauna_core::grid::{FoodWorld, GridBounds, GridPosition};
use fauna_core::status::StatusEffectDefinition;
use fauna_core::LifeState;
use fauna_events::{DeathCause, EventKind};

fn mud() -> Arc<StatusEffectDefinition> {
    Arc::new(StatusEffectDefinition {
        id: "mud".to_string(),
        permanent: true,
        additional_move_ticks: 2,
        ..StatusEffectDefinition::default()
    })
}

/// A long straight walk east along row 5
fn walker(harness: &mut Harness, speed: f32) -> fauna_core::AnimalController {
    let mut def = rabbit();
    def.movement_speed = speed;
    harness
        .spawn(1, def, GridPosition::new(0, 5), FROZEN_HUNGER)
        .with_seek_bounds(GridBounds::new(GridPosition::new(20, 0), GridPosition::new(29, 10)))
}

#[test]
fn test_eat_cycle() {
    let mut harness = Harness::new(10, 10, 1);
    let carrot = Entity::from_raw(100);
    assert!(harness.grid.add_food(carrot, "carrot", GridPosition::new(3, 2), None));

    let mut controller = harness.spawn(1, rabbit(), GridPosition::new(2, 2), FROZEN_HUNGER);
    controller.needs_mut().set_hunger(80.0);

    harness.tick(&mut controller);
    assert!(matches!(controller.action_state(), ActionState::Eating { .. }));
    let first = harness.events_at(1);
    assert!(first.iter().any(|e| matches!(e.kind, EventKind::TargetAcquired { .. })));
    assert!(first.iter().any(|e| matches!(e.kind, EventKind::StartedEating { .. })));

    for _ in 0..2 {
        harness.tick(&mut controller);
        assert!(controller.behavior().is_eating());
        assert_eq!(controller.current_hunger(), 80.0);
    }

    harness.tick(&mut controller);
    assert_eq!(controller.action_state(), ActionState::Idle);
    assert_eq!(controller.current_hunger(), 40.0);
    assert!(harness.grid.food(carrot).is_none());
    assert!(!controller.behavior().has_pooped());

    let finished: Vec<_> = harness
        .events_at(4)
        .into_iter()
        .filter_map(|e| match &e.kind {
            EventKind::FinishedEating { satiation, hunger, .. } => Some((*satiation, *hunger)),
            _ => None,
        })
        .collect();
    assert_eq!(finished, vec![(40.0, 40.0)]);
}

#[test]
fn test_eating_and_moving_are_exclusive() {
    let mut harness = Harness::new(10, 10, 2);
    assert!(harness
        .grid
        .add_food(Entity::from_raw(100), "carrot", GridPosition::new(3, 2), None));
    let mut controller = harness.spawn(1, rabbit(), GridPosition::new(0, 2), FROZEN_HUNGER);
    controller.needs_mut().set_hunger(80.0);

    let mut eating_cells = Vec::new();
    for _ in 0..6 {
        harness.tick(&mut controller);
        if controller.behavior().is_eating() {
            assert!(!controller.movement().has_plan());
            assert_eq!(controller.movement().accumulator(), 0.0);
            eating_cells.push(harness.position(&controller));
        }
    }

    // walks two tiles, then eats for three ticks without stepping
    assert_eq!(eating_cells, vec![Some(GridPosition::new(2, 2)); 3]);
    assert_eq!(controller.current_hunger(), 40.0);
}

#[test]
fn test_starvation_death_and_removal() {
    let mut harness = Harness::new(10, 10, 3);
    let mut def = rabbit();
    def.max_health = 10.0;
    def.damage_per_starvation_tick = 10.0;
    def.starvation_damage_tick_interval = 1;
    def.death_fade_ticks = 3;

    let mut controller = harness.spawn(1, def, GridPosition::new(4, 4), FROZEN_HUNGER);
    controller.needs_mut().set_hunger(100.0);

    assert_eq!(harness.tick(&mut controller), LifeState::Dying);
    assert!(controller.is_dying());
    assert_eq!(controller.current_health(), 0.0);
    assert_eq!(controller.death_cause(), Some(DeathCause::Starvation));

    let kinds: Vec<_> = harness.events_at(1).into_iter().map(|e| e.kind.clone()).collect();
    assert!(matches!(kinds[0], EventKind::Damaged { amount, .. } if amount == 10.0));
    assert!(matches!(
        kinds[1],
        EventKind::Died {
            cause: DeathCause::Starvation,
            ..
        }
    ));

    assert_eq!(harness.tick(&mut controller), LifeState::Dying);
    assert_eq!(harness.tick(&mut controller), LifeState::Dying);
    assert!(harness.position(&controller).is_some());

    assert_eq!(harness.tick(&mut controller), LifeState::Removed);
    assert!(controller.is_removed());
    assert!(harness.position(&controller).is_none());
    assert!(matches!(harness.events_at(4)[0].kind, EventKind::Removed));

    let before = harness.events.len();
    assert_eq!(harness.tick(&mut controller), LifeState::Removed);
    assert_eq!(harness.events.len(), before);
}

#[test]
fn test_slow_effect_stretches_moves() {
    let mut harness = Harness::new(30, 11, 4);
    let mut controller = walker(&mut harness, 1.0);
    controller.apply_status_effect(mud());
    assert_eq!(controller.effects().slow_penalty_ticks(), 2);

    for tick in 1..=9 {
        harness.tick(&mut controller);
        let expected = GridPosition::new(tick / 3, 5);
        assert_eq!(harness.position(&controller), Some(expected), "tick {}", tick);
    }
}

#[test]
fn test_full_speed_without_effect() {
    let mut harness = Harness::new(30, 11, 4);
    let mut controller = walker(&mut harness, 1.0);

    for _ in 0..9 {
        harness.tick(&mut controller);
    }
    assert_eq!(harness.position(&controller), Some(GridPosition::new(9, 5)));
}

#[test]
fn test_fractional_speed_accumulates() {
    let mut harness = Harness::new(30, 11, 5);
    let mut controller = walker(&mut harness, 0.4);

    for _ in 0..5 {
        harness.tick(&mut controller);
    }
    assert_eq!(harness.position(&controller), Some(GridPosition::new(2, 5)));

    for _ in 0..5 {
        harness.tick(&mut controller);
    }
    assert_eq!(harness.position(&controller), Some(GridPosition::new(4, 5)));
    assert!(controller.movement().accumulator() < 1.0);
}

#[test]
fn test_vanished_target_clears_path_and_target() {
    let mut harness = Harness::new(20, 20, 6);
    let carrot = Entity::from_raw(100);
    assert!(harness.grid.add_food(carrot, "carrot", GridPosition::new(8, 0), None));
    let mut def = rabbit();
    def.search_radius_tiles = 10;
    let mut controller = harness.spawn(1, def, GridPosition::new(0, 0), FROZEN_HUNGER);
    controller.needs_mut().set_hunger(80.0);

    harness.tick(&mut controller);
    assert_eq!(controller.movement().target(), Some(carrot));
    assert_eq!(controller.movement().path().len(), 6);
    assert_eq!(harness.position(&controller), Some(GridPosition::new(1, 0)));

    assert!(harness.grid.remove_food(carrot));
    harness.tick(&mut controller);

    assert!(controller.movement().target().is_none());
    assert!(controller.movement().path().is_empty());
    assert_eq!(controller.movement().accumulator(), 0.0);
    assert!(harness
        .events_at(2)
        .iter()
        .any(|e| matches!(e.kind, EventKind::TargetLost { food } if food == carrot.to_bits())));
}

#[test]
fn test_hunger_never_decreases_without_food() {
    let mut harness = Harness::new(20, 20, 7);
    let mut controller = harness.spawn(1, rabbit(), GridPosition::new(10, 10), 1);

    let mut last = controller.current_hunger();
    for _ in 0..130 {
        harness.tick(&mut controller);
        let hunger = controller.current_hunger();
        assert!(hunger >= last);
        assert!(hunger <= 100.0);
        last = hunger;
    }

    assert_eq!(last, 100.0);
    assert_eq!(controller.death_cause(), Some(DeathCause::Starvation));
    assert!(controller.is_removed());
}

#[test]
fn test_negative_zone_factor_is_refused() {
    let mut harness = Harness::new(30, 11, 8);
    let mut controller = walker(&mut harness, 1.0);
    assert!(!controller.apply_speed_multiplier(-1.0));

    for _ in 0..10 {
        harness.tick(&mut controller);
        assert!(controller.movement().accumulator() >= 0.0);
    }
    controller.remove_speed_multiplier(-1.0);
    for _ in 0..5 {
        harness.tick(&mut controller);
    }
    assert_eq!(harness.position(&controller), Some(GridPosition::new(15, 5)));
}
