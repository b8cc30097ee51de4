//! Status Effects
//!
//! Timed or permanent modifiers on an animal: damage over time, healing,
//! hunger drift, damage resistance and the extra tick cost per tile that
//! slows movement down.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Authored description of an effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusEffectDefinition {
    pub id: String,
    pub display_name: String,
    pub permanent: bool,
    pub duration_ticks: u32,
    pub damage_per_tick: f32,
    pub heal_per_tick: f32,
    /// Added to hunger every tick (negative feeds)
    pub hunger_per_tick: f32,
    /// 1 = normal, 0.5 = half damage, 2 = double damage
    pub damage_resistance_multiplier: f32,
    /// Extra ticks a one-tile move costs
    pub additional_move_ticks: u32,
    pub can_stack: bool,
    pub max_stacks: u32,
}

impl Default for StatusEffectDefinition {
    fn default() -> Self {
        Self {
            id: "status_effect".to_string(),
            display_name: "Status Effect".to_string(),
            permanent: false,
            duration_ticks: 10,
            damage_per_tick: 0.0,
            heal_per_tick: 0.0,
            hunger_per_tick: 0.0,
            damage_resistance_multiplier: 1.0,
            additional_move_ticks: 0,
            can_stack: false,
            max_stacks: 1,
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveEffect {
    definition: Arc<StatusEffectDefinition>,
    remaining_ticks: u32,
    stacks: u32,
}

/// Totals produced by one tick of active effects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectTick {
    pub damage: f32,
    pub heal: f32,
    pub hunger: f32,
    /// Ids of effects that ran out this tick
    pub expired: Vec<String>,
}

/// Active effects on one animal
#[derive(Debug, Clone)]
pub struct StatusEffects {
    active: Vec<ActiveEffect>,
    slow_penalty_ticks: u32,
    damage_resistance: f32,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusEffects {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            slow_penalty_ticks: 0,
            damage_resistance: 1.0,
        }
    }

    /// Apply an effect. Reapplying refreshes the duration and adds a stack
    /// when the effect stacks and is below its cap.
    pub fn apply(&mut self, definition: Arc<StatusEffectDefinition>) {
        if let Some(existing) = self.active.iter_mut().find(|e| e.definition.id == definition.id) {
            if definition.can_stack && existing.stacks < definition.max_stacks {
                existing.stacks += 1;
            }
            existing.remaining_ticks = definition.duration_ticks;
            existing.definition = definition;
        } else {
            debug!(effect = %definition.id, "status effect applied");
            self.active.push(ActiveEffect {
                remaining_ticks: definition.duration_ticks,
                stacks: 1,
                definition,
            });
        }
        self.refresh_cache();
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|e| e.definition.id != id);
        let removed = self.active.len() != before;
        if removed {
            self.refresh_cache();
        }
        removed
    }

    pub fn has(&self, id: &str) -> bool {
        self.active.iter().any(|e| e.definition.id == id)
    }

    pub fn stacks(&self, id: &str) -> u32 {
        self.active
            .iter()
            .find(|e| e.definition.id == id)
            .map(|e| e.stacks)
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.refresh_cache();
    }

    /// Sum the per-tick deltas and count down timed effects.
    pub fn on_tick(&mut self) -> EffectTick {
        let mut tick = EffectTick::default();
        for effect in &mut self.active {
            let stacks = effect.stacks as f32;
            tick.damage += effect.definition.damage_per_tick * stacks;
            tick.heal += effect.definition.heal_per_tick * stacks;
            tick.hunger += effect.definition.hunger_per_tick * stacks;

            if !effect.definition.permanent {
                effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
                if effect.remaining_ticks == 0 {
                    tick.expired.push(effect.definition.id.clone());
                }
            }
        }
        if !tick.expired.is_empty() {
            self.active
                .retain(|e| e.definition.permanent || e.remaining_ticks > 0);
            self.refresh_cache();
        }
        tick
    }

    /// Extra tick cost per tile from all active effects.
    pub fn slow_penalty_ticks(&self) -> u32 {
        self.slow_penalty_ticks
    }

    /// Product of all active resistance multipliers.
    pub fn damage_resistance_multiplier(&self) -> f32 {
        self.damage_resistance
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.active.iter().map(|e| e.definition.id.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn refresh_cache(&mut self) {
        self.slow_penalty_ticks = self
            .active
            .iter()
            .map(|e| e.definition.additional_move_ticks)
            .sum();
        self.damage_resistance = self
            .active
            .iter()
            .map(|e| e.definition.damage_resistance_multiplier)
            .product();
    }
}
