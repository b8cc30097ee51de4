//! Action State Machine
//!
//! Eating and digestion for one animal. The current action is a single
//! enum, so an animal can never be eating and pooping (or dying) at once.

use bevy_ecs::entity::Entity;
use rand::Rng;
use tracing::{debug, warn};

use crate::definition::{AnimalDefinition, Diet};
use crate::grid::{FoodView, FoodWorld};
use crate::needs::{satiation_for, Needs};

/// What the animal is busy with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Eating {
        food: Entity,
        remaining: u32,
    },
    /// Entered and left within a single tick
    Pooping,
    Dying {
        fade_remaining: u32,
    },
}

impl ActionState {
    pub fn label(&self) -> &'static str {
        match self {
            ActionState::Idle => "idle",
            ActionState::Eating { .. } => "eating",
            ActionState::Pooping => "pooping",
            ActionState::Dying { .. } => "dying",
        }
    }
}

/// Why `start_eating` said no
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EatRejection {
    Busy,
    NotInDiet,
}

/// A completed meal
#[derive(Debug, Clone, PartialEq)]
pub struct Meal {
    pub food: Entity,
    pub food_type: String,
    pub satiation: f32,
    pub hunger_after: f32,
}

/// Everything that happened in one behavior tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BehaviorTick {
    pub meal: Option<Meal>,
    /// Food that disappeared while being eaten
    pub lost_food: Option<Entity>,
    /// Visual variant of a dropping left this tick
    pub pooped: Option<u32>,
}

/// Action timers and state
#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    state: ActionState,
    has_pooped: bool,
    poop_delay_ticks: u32,
    poop_cooldown_ticks: u32,
}

impl Behavior {
    /// Starts clean, with a random initial digestion delay.
    pub fn new<R: Rng + ?Sized>(definition: &AnimalDefinition, rng: &mut R) -> Self {
        Self {
            state: ActionState::Idle,
            has_pooped: true,
            poop_delay_ticks: roll_poop_delay(definition, rng),
            poop_cooldown_ticks: 0,
        }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn can_act(&self) -> bool {
        self.state == ActionState::Idle
    }

    pub fn is_eating(&self) -> bool {
        matches!(self.state, ActionState::Eating { .. })
    }

    pub fn is_pooping(&self) -> bool {
        self.state == ActionState::Pooping
    }

    pub fn is_dying(&self) -> bool {
        matches!(self.state, ActionState::Dying { .. })
    }

    pub fn has_pooped(&self) -> bool {
        self.has_pooped
    }

    pub fn poop_delay_ticks(&self) -> u32 {
        self.poop_delay_ticks
    }

    pub fn start_eating(
        &mut self,
        food: &FoodView,
        diet: &Diet,
        definition: &AnimalDefinition,
    ) -> Result<(), EatRejection> {
        if !self.can_act() {
            warn!(food = ?food.entity, state = self.state.label(), "cannot start eating while busy");
            return Err(EatRejection::Busy);
        }
        if !diet.can_eat(&food.food_type) {
            warn!(food_type = %food.food_type, diet = %diet.name, "food not in diet");
            return Err(EatRejection::NotInDiet);
        }
        self.state = ActionState::Eating {
            food: food.entity,
            remaining: definition.eat_duration_ticks,
        };
        Ok(())
    }

    /// Advance eating and digestion by one tick.
    pub fn on_tick<W, R>(
        &mut self,
        definition: &AnimalDefinition,
        diet: &Diet,
        needs: &mut Needs,
        world: &mut W,
        rng: &mut R,
    ) -> BehaviorTick
    where
        W: FoodWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let mut tick = BehaviorTick::default();
        if self.is_dying() {
            return tick;
        }

        self.poop_delay_ticks = self.poop_delay_ticks.saturating_sub(1);
        self.poop_cooldown_ticks = self.poop_cooldown_ticks.saturating_sub(1);

        if let ActionState::Eating { food, remaining } = self.state {
            match world.food(food) {
                None => {
                    debug!(?food, "food vanished mid-meal");
                    self.state = ActionState::Idle;
                    tick.lost_food = Some(food);
                }
                Some(view) => {
                    let remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        tick.meal = Some(self.finish_eating(&view, definition, diet, needs, world, rng));
                    } else {
                        self.state = ActionState::Eating { food, remaining };
                    }
                }
            }
        }

        if !self.has_pooped && self.poop_delay_ticks == 0 && self.poop_cooldown_ticks == 0 && self.can_act() {
            tick.pooped = Some(self.poop(definition, rng));
        }
        tick
    }

    fn finish_eating<W, R>(
        &mut self,
        food: &FoodView,
        definition: &AnimalDefinition,
        diet: &Diet,
        needs: &mut Needs,
        world: &mut W,
        rng: &mut R,
    ) -> Meal
    where
        W: FoodWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let satiation = satiation_for(food, diet);
        let hunger_after = needs.eat(satiation);
        world.remove_food(food.entity);

        self.state = ActionState::Idle;
        self.has_pooped = false;
        self.poop_delay_ticks = roll_poop_delay(definition, rng);

        Meal {
            food: food.entity,
            food_type: food.food_type.clone(),
            satiation,
            hunger_after,
        }
    }

    fn poop<R: Rng + ?Sized>(&mut self, definition: &AnimalDefinition, rng: &mut R) -> u32 {
        self.state = ActionState::Pooping;
        self.poop_cooldown_ticks = definition.poop_cooldown_ticks;
        let variant = rng.gen_range(0..definition.poop_variants.max(1));
        self.has_pooped = true;
        self.state = ActionState::Idle;
        variant
    }

    /// Drop whatever is in progress. A meal cut short grants nothing.
    pub fn cancel_current_action(&mut self) {
        if matches!(self.state, ActionState::Eating { .. } | ActionState::Pooping) {
            self.state = ActionState::Idle;
        }
    }

    /// One-way switch into the fade-out.
    pub fn start_dying(&mut self, fade_ticks: u32) {
        if !self.is_dying() {
            self.state = ActionState::Dying {
                fade_remaining: fade_ticks,
            };
        }
    }

    /// Count the fade down. Returns true once it has finished.
    pub fn tick_fade(&mut self) -> bool {
        match &mut self.state {
            ActionState::Dying { fade_remaining } => {
                *fade_remaining = fade_remaining.saturating_sub(1);
                *fade_remaining == 0
            }
            _ => false,
        }
    }
}

fn roll_poop_delay<R: Rng + ?Sized>(definition: &AnimalDefinition, rng: &mut R) -> u32 {
    let min = definition.min_poop_delay_ticks;
    let max = definition.max_poop_delay_ticks.max(min);
    rng.gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::tests::{rabbit, rabbit_diet};
    use crate::grid::{GridPosition, GridWorld};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Fixture {
        def: AnimalDefinition,
        diet: Diet,
        needs: Needs,
        world: GridWorld,
        rng: SmallRng,
        behavior: Behavior,
        carrot: Entity,
    }

    fn fixture() -> Fixture {
        let mut def = rabbit();
        def.min_poop_delay_ticks = 2;
        def.max_poop_delay_ticks = 2;
        def.poop_cooldown_ticks = 5;
        let diet = rabbit_diet();
        let mut needs = Needs::new(&def, &diet, 1000);
        needs.set_hunger(80.0);
        let mut world = GridWorld::new(8, 8);
        let carrot = Entity::from_raw(50);
        world.add_food(carrot, "carrot", GridPosition::new(4, 4), None);
        let mut rng = SmallRng::seed_from_u64(1);
        let behavior = Behavior::new(&def, &mut rng);
        Fixture {
            def,
            diet,
            needs,
            world,
            rng,
            behavior,
            carrot,
        }
    }

    fn tick(f: &mut Fixture) -> BehaviorTick {
        f.behavior
            .on_tick(&f.def, &f.diet, &mut f.needs, &mut f.world, &mut f.rng)
    }

    #[test]
    fn test_starts_clean() {
        let mut f = fixture();
        assert!(f.behavior.has_pooped());
        assert!(f.behavior.can_act());
        for _ in 0..10 {
            assert!(tick(&mut f).pooped.is_none());
        }
    }

    #[test]
    fn test_eat_cycle_takes_duration_and_removes_food() {
        let mut f = fixture();
        let view = f.world.food(f.carrot).unwrap();
        f.behavior.start_eating(&view, &f.diet, &f.def).unwrap();
        assert!(!f.behavior.can_act());

        assert!(tick(&mut f).meal.is_none());
        assert!(tick(&mut f).meal.is_none());
        let done = tick(&mut f);
        let meal = done.meal.unwrap();
        assert_eq!(meal.satiation, 40.0);
        assert_eq!(meal.hunger_after, 40.0);
        assert_eq!(f.needs.hunger(), 40.0);
        assert!(f.world.food(f.carrot).is_none());
        assert!(f.behavior.can_act());
        assert!(!f.behavior.has_pooped());
    }

    #[test]
    fn test_poop_after_delay_then_cooldown() {
        let mut f = fixture();
        let view = f.world.food(f.carrot).unwrap();
        f.behavior.start_eating(&view, &f.diet, &f.def).unwrap();
        for _ in 0..3 {
            tick(&mut f);
        }
        // delay of 2 ticks after the meal
        assert!(tick(&mut f).pooped.is_none());
        let pooped = tick(&mut f).pooped;
        assert!(pooped.is_some_and(|v| v < f.def.poop_variants));
        assert!(f.behavior.has_pooped());
        assert_eq!(f.behavior.state(), ActionState::Idle);
        assert!(tick(&mut f).pooped.is_none());
    }

    #[test]
    fn test_rejects_when_busy_or_not_in_diet() {
        let mut f = fixture();
        let meat = FoodView {
            entity: Entity::from_raw(60),
            food_type: "meat".to_string(),
            cell: GridPosition::new(1, 1),
            nutrition: None,
        };
        assert_eq!(
            f.behavior.start_eating(&meat, &f.diet, &f.def),
            Err(EatRejection::NotInDiet)
        );

        let view = f.world.food(f.carrot).unwrap();
        f.behavior.start_eating(&view, &f.diet, &f.def).unwrap();
        assert_eq!(
            f.behavior.start_eating(&view, &f.diet, &f.def),
            Err(EatRejection::Busy)
        );
    }

    #[test]
    fn test_cancel_grants_nothing() {
        let mut f = fixture();
        let view = f.world.food(f.carrot).unwrap();
        f.behavior.start_eating(&view, &f.diet, &f.def).unwrap();
        tick(&mut f);
        f.behavior.cancel_current_action();

        assert!(f.behavior.can_act());
        for _ in 0..5 {
            assert!(tick(&mut f).meal.is_none());
        }
        assert_eq!(f.needs.hunger(), 80.0);
        assert!(f.world.food(f.carrot).is_some());
    }

    #[test]
    fn test_vanished_food_ends_meal() {
        let mut f = fixture();
        let view = f.world.food(f.carrot).unwrap();
        f.behavior.start_eating(&view, &f.diet, &f.def).unwrap();
        f.world.remove_food(f.carrot);

        let result = tick(&mut f);
        assert_eq!(result.lost_food, Some(f.carrot));
        assert!(result.meal.is_none());
        assert!(f.behavior.can_act());
        assert_eq!(f.needs.hunger(), 80.0);
    }

    #[test]
    fn test_dying_is_terminal() {
        let mut f = fixture();
        f.behavior.start_dying(2);
        f.behavior.cancel_current_action();
        assert!(f.behavior.is_dying());
        assert!(!f.behavior.can_act());

        assert!(!f.behavior.tick_fade());
        assert!(f.behavior.tick_fade());
        assert!(f.behavior.is_dying());
    }
}
