//! Animal Controller
//!
//! Per-agent orchestrator. Runs the needs tracker, status effects and
//! action state machine every tick, makes movement decisions at the
//! species' thinking cadence, and walks the animal through its life cycle:
//! alive, dying (fade-out), removed.

use bevy_ecs::prelude::*;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info};

use fauna_events::{AnimalEvent, AnimalSnapshot, DeathCause, EventKind, ThoughtTrigger};

use crate::behavior::{ActionState, Behavior};
use crate::definition::{AnimalDefinition, DefinitionError, Diet};
use crate::events::EventSink;
use crate::grid::{FoodWorld, GridBounds, GridPosition, GridService};
use crate::movement::{Decision, Movement};
use crate::needs::Needs;
use crate::status::{StatusEffectDefinition, StatusEffects};

/// Damage that leaves health at or below this fraction triggers a thought
const LOW_HEALTH_FRACTION: f32 = 0.3;

/// Where an animal is in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Alive,
    Dying,
    Removed,
}

/// Per-tick inputs shared by every agent
pub struct AgentContext<'a, R: ?Sized, S: ?Sized> {
    pub tick: u64,
    pub rng: &'a mut R,
    pub events: &'a mut S,
}

impl<'a, R, S> AgentContext<'a, R, S>
where
    R: Rng + ?Sized,
    S: EventSink + ?Sized,
{
    pub fn new(tick: u64, rng: &'a mut R, events: &'a mut S) -> Self {
        Self { tick, rng, events }
    }
}

/// One animal's complete state
#[derive(Component, Debug, Clone)]
pub struct AnimalController {
    entity: Entity,
    definition: Arc<AnimalDefinition>,
    diet: Arc<Diet>,
    needs: Needs,
    behavior: Behavior,
    movement: Movement,
    effects: StatusEffects,
    think_cooldown: u32,
    thought_cooldown: u32,
    death_cause: Option<DeathCause>,
    removed: bool,
    cell: GridPosition,
}

impl AnimalController {
    /// Build a controller for `entity`. Fails if the definition does not
    /// validate; the caller must not spawn the animal in that case.
    pub fn new<R: Rng + ?Sized>(
        entity: Entity,
        definition: Arc<AnimalDefinition>,
        hunger_tick_interval: u32,
        rng: &mut R,
    ) -> Result<Self, DefinitionError> {
        definition.validate()?;
        let diet = definition.shared_diet()?;
        let needs = Needs::new(&definition, &diet, hunger_tick_interval);
        let behavior = Behavior::new(&definition, rng);

        Ok(Self {
            entity,
            definition,
            diet,
            needs,
            behavior,
            movement: Movement::new(),
            effects: StatusEffects::new(),
            think_cooldown: 0,
            thought_cooldown: 0,
            death_cause: None,
            removed: false,
            cell: GridPosition::ZERO,
        })
    }

    /// Walk toward `bounds` before doing anything else.
    pub fn with_seek_bounds(mut self, bounds: GridBounds) -> Self {
        self.movement = self.movement.with_seek_bounds(bounds);
        self
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn species_name(&self) -> &str {
        &self.definition.species
    }

    pub fn definition(&self) -> &AnimalDefinition {
        &self.definition
    }

    pub fn current_health(&self) -> f32 {
        self.needs.health()
    }

    pub fn current_hunger(&self) -> f32 {
        self.needs.hunger()
    }

    pub fn is_dying(&self) -> bool {
        self.behavior.is_dying()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death_cause
    }

    pub fn action_state(&self) -> ActionState {
        self.behavior.state()
    }

    pub fn cell(&self) -> GridPosition {
        self.cell
    }

    pub fn diet(&self) -> &Arc<Diet> {
        &self.diet
    }

    pub fn needs(&self) -> &Needs {
        &self.needs
    }

    pub fn needs_mut(&mut self) -> &mut Needs {
        &mut self.needs
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn movement(&self) -> &Movement {
        &self.movement
    }

    pub fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    pub fn life_state(&self) -> LifeState {
        if self.removed {
            LifeState::Removed
        } else if self.behavior.is_dying() {
            LifeState::Dying
        } else {
            LifeState::Alive
        }
    }

    /// Record the tile the animal was placed on.
    pub fn place(&mut self, cell: GridPosition) {
        self.cell = cell;
    }

    /// Run one simulation tick.
    pub fn on_tick<W, R, S>(&mut self, world: &mut W, ctx: &mut AgentContext<'_, R, S>) -> LifeState
    where
        W: GridService + FoodWorld + ?Sized,
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        if self.removed {
            return LifeState::Removed;
        }
        if self.behavior.is_dying() {
            if self.behavior.tick_fade() {
                world.release(self.entity);
                self.removed = true;
                info!(species = %self.definition.species, agent = ?self.entity, "animal removed");
                self.emit(ctx, EventKind::Removed);
                return LifeState::Removed;
            }
            return LifeState::Dying;
        }
        if let Some(cell) = world.position_of(self.entity) {
            self.cell = cell;
        }

        if let Some(damage) = self.needs.on_tick() {
            self.after_damage(damage, DeathCause::Starvation, ctx);
            if self.behavior.is_dying() {
                return LifeState::Dying;
            }
        }

        self.tick_effects(ctx);
        if self.behavior.is_dying() {
            return LifeState::Dying;
        }

        let outcome = self
            .behavior
            .on_tick(&self.definition, &self.diet, &mut self.needs, world, &mut *ctx.rng);
        if let Some(food) = outcome.lost_food {
            self.emit(ctx, EventKind::TargetLost { food: food.to_bits() });
        }
        if let Some(meal) = outcome.meal {
            debug!(agent = ?self.entity, food_type = %meal.food_type, hunger = meal.hunger_after, "finished eating");
            self.emit(
                ctx,
                EventKind::FinishedEating {
                    food: meal.food.to_bits(),
                    food_type: meal.food_type,
                    satiation: meal.satiation,
                    hunger: meal.hunger_after,
                },
            );
        }
        if let Some(variant) = outcome.pooped {
            let cell = self.cell.to_cell_ref();
            self.emit(ctx, EventKind::Pooped { cell, variant });
            self.show_thought(ThoughtTrigger::Pooping, ctx);
        }

        self.thought_cooldown = self.thought_cooldown.saturating_sub(1);
        self.think_cooldown = self.think_cooldown.saturating_sub(1);

        if self.think_cooldown == 0 && self.behavior.can_act() && !self.movement.is_paused() {
            self.make_decision(world, ctx);
            self.think_cooldown = self.definition.thinking_tick_interval;
        }

        let movement = self.movement.on_tick(
            self.entity,
            &self.definition,
            self.effects.slow_penalty_ticks(),
            !self.behavior.can_act(),
            world,
        );
        if let Some(food) = movement.lost_target {
            self.emit(ctx, EventKind::TargetLost { food: food.to_bits() });
        }
        if let Some(view) = movement.reached_food {
            self.movement.clear_plan();
            if self
                .behavior
                .start_eating(&view, &self.diet, &self.definition)
                .is_ok()
            {
                self.emit(
                    ctx,
                    EventKind::StartedEating {
                        food: view.entity.to_bits(),
                        food_type: view.food_type,
                    },
                );
                self.show_thought(ThoughtTrigger::Eating, ctx);
            }
        }
        if let Some(cell) = world.position_of(self.entity) {
            self.cell = cell;
        }

        LifeState::Alive
    }

    fn make_decision<W, R, S>(&mut self, world: &mut W, ctx: &mut AgentContext<'_, R, S>)
    where
        W: GridService + FoodWorld + ?Sized,
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        let hungry = self.needs.is_hungry();
        if hungry && !self.movement.is_seeking_center() {
            self.show_thought(ThoughtTrigger::Hungry, ctx);
        }
        let decision = self.movement.make_decision(
            self.entity,
            &self.definition,
            &self.diet,
            hungry,
            &*world,
            &mut *ctx.rng,
        );
        debug!(agent = ?self.entity, hungry, ?decision, "decision");

        if let Decision::Foraging { food, food_type, cell } = decision {
            self.emit(
                ctx,
                EventKind::TargetAcquired {
                    food: food.to_bits(),
                    food_type,
                    cell: cell.to_cell_ref(),
                },
            );
        }
    }

    fn tick_effects<R, S>(&mut self, ctx: &mut AgentContext<'_, R, S>)
    where
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        if self.effects.is_empty() {
            return;
        }
        let tick = self.effects.on_tick();
        for id in &tick.expired {
            debug!(agent = ?self.entity, effect = %id, "status effect expired");
        }
        if tick.heal > 0.0 {
            self.needs.heal(tick.heal);
        }
        if tick.hunger != 0.0 {
            self.needs.modify_hunger(tick.hunger);
        }
        if tick.damage > 0.0 {
            let scaled = tick.damage * self.effects.damage_resistance_multiplier();
            let taken = self.needs.take_damage(scaled);
            self.after_damage(taken, DeathCause::StatusEffect, ctx);
        }
    }

    /// Apply outside damage, scaled by damage resistance. Returns the
    /// health actually lost.
    pub fn take_damage<R, S>(&mut self, amount: f32, ctx: &mut AgentContext<'_, R, S>) -> f32
    where
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        if self.removed || self.behavior.is_dying() {
            return 0.0;
        }
        let scaled = amount * self.effects.damage_resistance_multiplier();
        let taken = self.needs.take_damage(scaled);
        self.after_damage(taken, DeathCause::Damage, ctx);
        taken
    }

    fn after_damage<R, S>(&mut self, taken: f32, cause: DeathCause, ctx: &mut AgentContext<'_, R, S>)
    where
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        if taken <= 0.0 {
            return;
        }
        let health = self.needs.health();
        self.emit(ctx, EventKind::Damaged { amount: taken, health });

        if self.needs.is_dead() {
            self.die(cause, ctx);
        } else if self.needs.health_fraction() <= LOW_HEALTH_FRACTION {
            self.show_thought(ThoughtTrigger::HealthLow, ctx);
        }
    }

    /// Stop everything and start the fade. One-way.
    fn die<R, S>(&mut self, cause: DeathCause, ctx: &mut AgentContext<'_, R, S>)
    where
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        if self.behavior.is_dying() {
            return;
        }
        self.movement.stop_all_movement();
        self.behavior.cancel_current_action();
        self.behavior.start_dying(self.definition.death_fade_ticks);
        self.death_cause = Some(cause);

        info!(species = %self.definition.species, agent = ?self.entity, %cause, "animal died");
        let cell = self.cell.to_cell_ref();
        self.emit(ctx, EventKind::Died { cause, cell });
    }

    /// Show a thought bubble if the cooldown allows and a line exists.
    pub fn show_thought<R, S>(&mut self, trigger: ThoughtTrigger, ctx: &mut AgentContext<'_, R, S>) -> bool
    where
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        if self.thought_cooldown > 0 || self.behavior.is_dying() {
            return false;
        }
        let Some(line) = self
            .definition
            .thoughts
            .pick(&self.definition.species, trigger, &mut *ctx.rng)
        else {
            return false;
        };
        self.thought_cooldown = self.definition.thought_cooldown_ticks;
        self.emit(ctx, EventKind::ThoughtShown { trigger, line });
        true
    }

    /// Drop any meal in progress and the movement plan.
    pub fn cancel_current_action(&mut self) {
        if self.behavior.is_dying() {
            return;
        }
        self.behavior.cancel_current_action();
        self.movement.clear_plan();
    }

    /// Enter a speed zone. Negative or non-finite factors are refused.
    pub fn apply_speed_multiplier(&mut self, factor: f32) -> bool {
        self.movement.apply_speed_multiplier(factor)
    }

    pub fn remove_speed_multiplier(&mut self, factor: f32) {
        self.movement.remove_speed_multiplier(factor);
    }

    pub fn apply_status_effect(&mut self, effect: Arc<StatusEffectDefinition>) {
        if !self.behavior.is_dying() {
            self.effects.apply(effect);
        }
    }

    pub fn remove_status_effect(&mut self, id: &str) -> bool {
        self.effects.remove(id)
    }

    pub fn has_status_effect(&self, id: &str) -> bool {
        self.effects.has(id)
    }

    /// Observable state for summaries and inspectors.
    pub fn snapshot(&self) -> AnimalSnapshot {
        AnimalSnapshot {
            agent: self.entity.to_bits(),
            species: self.definition.species.clone(),
            cell: self.cell.to_cell_ref(),
            health: self.needs.health(),
            max_health: self.needs.max_health(),
            hunger: self.needs.hunger(),
            max_hunger: self.needs.max_hunger(),
            action: self.behavior.state().label().to_string(),
            has_target: self.movement.target().is_some(),
            effects: self.effects.active_ids(),
        }
    }

    fn emit<R, S>(&self, ctx: &mut AgentContext<'_, R, S>, kind: EventKind)
    where
        R: Rng + ?Sized,
        S: EventSink + ?Sized,
    {
        ctx.events.emit(AnimalEvent::new(
            ctx.tick,
            self.entity.to_bits(),
            self.definition.species.clone(),
            kind,
        ));
    }
}
