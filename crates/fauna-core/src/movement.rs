//! Movement Planner
//!
//! Chooses where an animal goes (walk into frame, forage, wander) and
//! advances it whole tiles per tick. Fractional speeds bank into an
//! accumulator so slow effects average out exactly over many ticks.

use bevy_ecs::entity::Entity;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

use crate::definition::{AnimalDefinition, Diet};
use crate::grid::{FoodView, FoodWorld, GridBounds, GridPosition, GridService};

/// Absorbs float error so 3 x (1/3) still counts as one tile.
const ACCUMULATOR_EPSILON: f64 = 1e-9;

/// Outcome of a movement decision
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Walking toward the saved bounds after spawning outside them
    SeekingCenter,
    /// Heading for a food item
    Foraging {
        food: Entity,
        food_type: String,
        cell: GridPosition,
    },
    /// One random step
    Wandering(GridPosition),
    /// Standing still for a number of ticks
    Paused(u32),
    /// Nothing valid to do this cycle
    Idle,
}

/// What happened during one movement tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementTick {
    pub tiles_moved: u32,
    /// Standing on the eat ring of this food
    pub reached_food: Option<FoodView>,
    /// The food target disappeared; path and target were cleared
    pub lost_target: Option<Entity>,
}

/// Path, target and speed state for one animal
#[derive(Debug, Clone, Default)]
pub struct Movement {
    path: VecDeque<GridPosition>,
    target: Option<Entity>,
    target_cell: Option<GridPosition>,
    accumulator: f64,
    pause_remaining: u32,
    seek_bounds: Option<GridBounds>,
    zone_multipliers: Vec<f32>,
}

impl Movement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start in "walk into frame" mode toward `bounds`.
    pub fn with_seek_bounds(mut self, bounds: GridBounds) -> Self {
        self.seek_bounds = Some(bounds);
        self
    }

    pub fn path(&self) -> &VecDeque<GridPosition> {
        &self.path
    }

    pub fn target(&self) -> Option<Entity> {
        self.target
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn is_paused(&self) -> bool {
        self.pause_remaining > 0
    }

    pub fn is_seeking_center(&self) -> bool {
        self.seek_bounds.is_some()
    }

    pub fn has_plan(&self) -> bool {
        !self.path.is_empty() || self.target.is_some()
    }

    /// Drop path and target together.
    pub fn clear_plan(&mut self) {
        self.path.clear();
        self.target = None;
        self.target_cell = None;
    }

    /// Clear the plan, any pause and the banked movement budget.
    pub fn stop_all_movement(&mut self) {
        self.clear_plan();
        self.pause_remaining = 0;
        self.accumulator = 0.0;
    }

    /// Enter a speed zone. Returns false, leaving speed untouched, for a
    /// negative or non-finite factor.
    pub fn apply_speed_multiplier(&mut self, factor: f32) -> bool {
        if !is_valid_speed_factor(factor) {
            warn!(factor, "rejected speed multiplier");
            return false;
        }
        self.zone_multipliers.push(factor);
        true
    }

    pub fn remove_speed_multiplier(&mut self, factor: f32) {
        if let Some(idx) = self
            .zone_multipliers
            .iter()
            .position(|m| (m - factor).abs() < f32::EPSILON)
        {
            self.zone_multipliers.remove(idx);
        }
    }

    /// Lowest active zone multiplier, 1 when none apply.
    pub fn zone_multiplier(&self) -> f32 {
        self.zone_multipliers.iter().copied().reduce(f32::min).unwrap_or(1.0)
    }

    /// Tiles per tick after zone and slow penalties.
    pub fn effective_speed(&self, movement_speed: f32, slow_penalty_ticks: u32) -> f64 {
        (movement_speed as f64 * self.zone_multiplier() as f64) / (1.0 + slow_penalty_ticks as f64)
    }

    /// In bounds, unoccupied, and not movement-blocked unless it is the
    /// current food target's own tile.
    pub fn is_valid_move<W: GridService + ?Sized>(&self, world: &W, cell: GridPosition) -> bool {
        world.is_valid(cell)
            && !world.is_occupied(cell)
            && (!world.is_movement_blocked(cell) || self.target_cell == Some(cell))
    }

    /// Pick a new plan. Called at the animal's thinking cadence.
    pub fn make_decision<W, R>(
        &mut self,
        me: Entity,
        definition: &AnimalDefinition,
        diet: &Diet,
        hungry: bool,
        world: &W,
        rng: &mut R,
    ) -> Decision
    where
        W: GridService + FoodWorld + ?Sized,
        R: Rng + ?Sized,
    {
        let Some(current) = world.position_of(me) else {
            return Decision::Idle;
        };

        // seek mode owns the whole decision, including the one that ends it
        if let Some(bounds) = self.seek_bounds {
            if bounds.contains(current) {
                debug!(?me, "entered bounds, leaving seek mode");
                self.seek_bounds = None;
                return Decision::Idle;
            }
            let path = world.shortest_path(current, bounds.center());
            if path.is_empty() {
                trace!(?me, "bounds center unreachable");
                return Decision::Idle;
            }
            self.clear_plan();
            self.path = path.into();
            return Decision::SeekingCenter;
        }

        if hungry {
            if let Some(decision) = self.plan_to_food(current, definition, diet, world) {
                return decision;
            }
        }

        self.wander(current, definition, world, rng)
    }

    /// Score reachable foods by `priority / (1 + distance)` and path to the
    /// best one's eat ring. First candidate wins ties.
    fn plan_to_food<W>(
        &mut self,
        current: GridPosition,
        definition: &AnimalDefinition,
        diet: &Diet,
        world: &W,
    ) -> Option<Decision>
    where
        W: GridService + FoodWorld + ?Sized,
    {
        let mut scored: Vec<(f32, FoodView)> = Vec::new();
        for entity in world.entities_in_radius(current, definition.search_radius_tiles, true) {
            let Some(view) = world.food(entity) else {
                continue;
            };
            let Some(pref) = diet.preference(&view.food_type) else {
                continue;
            };
            let score = pref.priority / (1.0 + current.manhattan_distance(&view.cell) as f32);
            scored.push((score, view));
        }
        // stable: equal scores keep discovery order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        for (score, view) in scored {
            // the candidate's tile counts as walkable while we evaluate it
            self.target_cell = Some(view.cell);
            if let Some(path) = self.path_to_ring(current, view.cell, definition.eat_distance_tiles, world) {
                trace!(food = ?view.entity, score, steps = path.len(), "food target chosen");
                self.path = path.into();
                self.target = Some(view.entity);
                return Some(Decision::Foraging {
                    food: view.entity,
                    food_type: view.food_type,
                    cell: view.cell,
                });
            }
        }
        self.clear_plan();
        None
    }

    /// Shortest path onto any tile exactly `distance` from `food_cell`.
    /// `Some(empty)` when already standing on the ring.
    fn path_to_ring<W>(
        &self,
        current: GridPosition,
        food_cell: GridPosition,
        distance: i32,
        world: &W,
    ) -> Option<Vec<GridPosition>>
    where
        W: GridService + ?Sized,
    {
        if current.manhattan_distance(&food_cell) == distance {
            return Some(Vec::new());
        }
        let mut best: Option<Vec<GridPosition>> = None;
        for cell in food_cell.ring(distance) {
            if !self.is_valid_move(world, cell) {
                continue;
            }
            let path = world.shortest_path(current, cell);
            if path.is_empty() {
                continue;
            }
            if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                best = Some(path);
            }
        }
        best
    }

    fn wander<W, R>(&mut self, current: GridPosition, definition: &AnimalDefinition, world: &W, rng: &mut R) -> Decision
    where
        W: GridService + ?Sized,
        R: Rng + ?Sized,
    {
        self.clear_plan();

        if rng.gen_range(0..100) < definition.wander_pause_tick_chance {
            let min = definition.min_wander_pause_ticks;
            let max = definition.max_wander_pause_ticks.max(min);
            self.pause_remaining = rng.gen_range(min..=max);
            return Decision::Paused(self.pause_remaining);
        }

        let mut directions = GridPosition::CARDINALS;
        directions.shuffle(rng);
        for step in directions {
            let cell = current + step;
            if self.is_valid_move(world, cell) {
                self.path.push_back(cell);
                return Decision::Wandering(cell);
            }
        }
        Decision::Idle
    }

    /// Advance along the plan. `suspended` is true while eating, pooping
    /// or dying; no budget carries across a suspension. Budget left over
    /// when the plan runs out or food is reached is dropped, so every new
    /// plan starts from zero.
    pub fn on_tick<W>(
        &mut self,
        me: Entity,
        definition: &AnimalDefinition,
        slow_penalty_ticks: u32,
        suspended: bool,
        world: &mut W,
    ) -> MovementTick
    where
        W: GridService + FoodWorld + ?Sized,
    {
        let mut tick = MovementTick::default();
        if suspended {
            self.accumulator = 0.0;
            return tick;
        }

        let mut food_view = None;
        if let Some(target) = self.target {
            match world.food(target) {
                Some(view) => {
                    if self.target_cell != Some(view.cell) {
                        self.target_cell = Some(view.cell);
                        self.replan_to_target(me, &view, definition, world);
                    }
                    food_view = Some(view);
                }
                None => {
                    debug!(?me, food = ?target, "food target vanished");
                    self.clear_plan();
                    tick.lost_target = Some(target);
                }
            }
        }

        let Some(mut current) = world.position_of(me) else {
            self.accumulator = 0.0;
            return tick;
        };

        if let Some(view) = &food_view {
            if current.manhattan_distance(&view.cell) == definition.eat_distance_tiles {
                self.clear_plan();
                self.accumulator = 0.0;
                tick.reached_food = food_view;
                return tick;
            }
        }

        if self.pause_remaining > 0 {
            self.pause_remaining -= 1;
            self.accumulator = 0.0;
            return tick;
        }

        if self.path.is_empty() {
            self.accumulator = 0.0;
            if let Some(view) = &food_view {
                // target with no path: one attempt to recover, else drop both
                if !self.replan_to_target(me, view, definition, world) {
                    self.clear_plan();
                }
            }
            return tick;
        }

        let speed = self.effective_speed(definition.movement_speed, slow_penalty_ticks);
        self.accumulator = (self.accumulator + speed).max(0.0);
        let budget = (self.accumulator + ACCUMULATOR_EPSILON).floor() as u32;
        let mut replanned = false;

        while tick.tiles_moved < budget {
            let Some(&next) = self.path.front() else {
                break;
            };

            if self.is_valid_move(world, next) && world.commit_position(me, next) {
                self.path.pop_front();
                tick.tiles_moved += 1;
                current = next;

                if let Some(view) = &food_view {
                    if current.manhattan_distance(&view.cell) == definition.eat_distance_tiles {
                        self.clear_plan();
                        tick.reached_food = food_view.clone();
                        break;
                    }
                }
                if self.path.is_empty() {
                    self.clear_plan();
                    break;
                }
                continue;
            }

            trace!(?me, cell = %next, "step blocked");
            match &food_view {
                Some(view) if !replanned => {
                    replanned = true;
                    if !self.replan_to_target(me, view, definition, world) {
                        self.clear_plan();
                        break;
                    }
                }
                _ => {
                    self.clear_plan();
                    break;
                }
            }
        }

        self.accumulator = (self.accumulator - tick.tiles_moved as f64).max(0.0);
        if tick.reached_food.is_some() || !self.has_plan() {
            self.accumulator = 0.0;
        }
        tick
    }

    /// Re-path to the current target's ring. Returns false if unreachable.
    fn replan_to_target<W>(&mut self, me: Entity, view: &FoodView, definition: &AnimalDefinition, world: &W) -> bool
    where
        W: GridService + ?Sized,
    {
        let Some(current) = world.position_of(me) else {
            return false;
        };
        match self.path_to_ring(current, view.cell, definition.eat_distance_tiles, world) {
            Some(path) => {
                self.path = path.into();
                true
            }
            None => false,
        }
    }
}

/// Zone factors scale speed; 0 freezes an animal in place.
pub fn is_valid_speed_factor(factor: f32) -> bool {
    factor.is_finite() && factor >= 0.0
}
