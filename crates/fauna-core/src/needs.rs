//! Needs Tracker
//!
//! Hunger, health and starvation bookkeeping for a single animal. Knows
//! nothing about paths or eating; every timer is counted in ticks.

use crate::definition::{AnimalDefinition, Diet};
use crate::grid::FoodView;

/// Hunger that a food item removes for this diet.
///
/// Items carrying scalable nutrition use `base * potency`; everything else
/// falls back to the diet's static satiation value.
pub fn satiation_for(food: &FoodView, diet: &Diet) -> f32 {
    match food.nutrition {
        Some(nutrition) => nutrition.value(),
        None => diet.satiation_value(&food.food_type),
    }
}

/// Per-agent hunger and health state
#[derive(Debug, Clone, PartialEq)]
pub struct Needs {
    health: f32,
    max_health: f32,
    hunger: f32,
    max_hunger: f32,
    hunger_increase_rate: f32,
    hunger_threshold: f32,
    /// Ticks between hunger increases
    hunger_tick_interval: u32,
    hunger_tick_counter: u32,
    starvation_interval: u32,
    starvation_damage: f32,
    starvation_counter: u32,
    flash_ticks: u32,
    flash_remaining: u32,
}

impl Needs {
    /// Full health, no hunger.
    pub fn new(definition: &AnimalDefinition, diet: &Diet, hunger_tick_interval: u32) -> Self {
        Self {
            health: definition.max_health,
            max_health: definition.max_health,
            hunger: 0.0,
            max_hunger: diet.max_hunger,
            hunger_increase_rate: diet.hunger_increase_rate,
            hunger_threshold: diet.hunger_threshold,
            hunger_tick_interval: hunger_tick_interval.max(1),
            hunger_tick_counter: 0,
            starvation_interval: definition.starvation_damage_tick_interval.max(1),
            starvation_damage: definition.damage_per_starvation_tick,
            starvation_counter: 0,
            flash_ticks: definition.damage_flash_ticks,
            flash_remaining: 0,
        }
    }

    /// Advance one tick. Returns the starvation damage dealt this tick, if any.
    pub fn on_tick(&mut self) -> Option<f32> {
        if self.flash_remaining > 0 {
            self.flash_remaining -= 1;
        }

        self.hunger_tick_counter += 1;
        if self.hunger_tick_counter >= self.hunger_tick_interval {
            self.hunger_tick_counter = 0;
            self.hunger = (self.hunger + self.hunger_increase_rate).min(self.max_hunger);
        }

        if self.is_starving() {
            self.starvation_counter += 1;
            if self.starvation_counter >= self.starvation_interval {
                self.starvation_counter = 0;
                return Some(self.take_damage(self.starvation_damage));
            }
        } else {
            self.starvation_counter = 0;
        }
        None
    }

    /// Remove `satiation` hunger, floored at zero. Returns the new hunger.
    pub fn eat(&mut self, satiation: f32) -> f32 {
        self.hunger = (self.hunger - satiation.max(0.0)).max(0.0);
        self.hunger
    }

    pub fn eat_food(&mut self, food: &FoodView, diet: &Diet) -> f32 {
        self.eat(satiation_for(food, diet))
    }

    /// Clamp health down and start the damage flash. Returns the damage
    /// actually taken.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        self.flash_remaining = self.flash_ticks;
        before - self.health
    }

    pub fn heal(&mut self, amount: f32) {
        if amount > 0.0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    /// Shift hunger by `delta` (positive makes the animal hungrier).
    pub fn modify_hunger(&mut self, delta: f32) {
        self.hunger = (self.hunger + delta).clamp(0.0, self.max_hunger);
    }

    pub fn set_hunger(&mut self, hunger: f32) {
        self.hunger = hunger.clamp(0.0, self.max_hunger);
    }

    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health);
    }

    pub fn is_hungry(&self) -> bool {
        self.hunger >= self.hunger_threshold
    }

    pub fn is_starving(&self) -> bool {
        self.hunger >= self.max_hunger
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_remaining > 0
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn hunger(&self) -> f32 {
        self.hunger
    }

    pub fn max_hunger(&self) -> f32 {
        self.max_hunger
    }

    pub fn health_fraction(&self) -> f32 {
        self.health / self.max_health
    }
}
