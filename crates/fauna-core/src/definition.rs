//! Species Definitions
//!
//! Immutable, shared data describing a species: its stats, timers, diet and
//! thought lines. Authored in the config file, resolved once at load time and
//! handed to every agent of that species behind an `Arc`.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use fauna_events::ThoughtTrigger;

/// Errors found while validating or resolving definitions
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    #[error("species '{species}' references unknown diet '{diet}'")]
    MissingDiet { species: String, diet: String },

    #[error("no definition for species '{0}'")]
    MissingDefinition(String),

    #[error("duplicate definition for '{0}'")]
    Duplicate(String),

    #[error("'{owner}': {field} must be positive (got {value})")]
    NotPositive {
        owner: String,
        field: &'static str,
        value: f32,
    },

    #[error("'{owner}': {field} must be at least 1")]
    ZeroInterval { owner: String, field: &'static str },

    #[error("'{owner}': {field} has min {min} greater than max {max}")]
    InvalidRange {
        owner: String,
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("'{owner}': {field} {value} is outside 0..={max}")]
    OutOfRange {
        owner: String,
        field: &'static str,
        value: f32,
        max: f32,
    },
}

/// How much one food type is worth to a diet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPreference {
    pub food_type: String,
    /// Hunger removed when eaten
    pub satiation: f32,
    /// Higher is preferred when choosing a target
    #[serde(default = "default_priority")]
    pub priority: f32,
}

fn default_priority() -> f32 {
    1.0
}

/// Hunger parameters and accepted foods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diet {
    pub name: String,
    pub max_hunger: f32,
    /// Hunger gained per hunger tick
    pub hunger_increase_rate: f32,
    /// Hunger at which the animal starts looking for food
    pub hunger_threshold: f32,
    #[serde(default)]
    pub foods: Vec<DietPreference>,
}

impl Diet {
    pub fn can_eat(&self, food_type: &str) -> bool {
        self.preference(food_type).is_some()
    }

    pub fn preference(&self, food_type: &str) -> Option<&DietPreference> {
        self.foods.iter().find(|p| p.food_type == food_type)
    }

    /// Static satiation for a food type, 0 if not part of the diet.
    pub fn satiation_value(&self, food_type: &str) -> f32 {
        self.preference(food_type).map(|p| p.satiation).unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        positive(&self.name, "max_hunger", self.max_hunger)?;
        positive(&self.name, "hunger_increase_rate", self.hunger_increase_rate)?;
        if !(0.0..=self.max_hunger).contains(&self.hunger_threshold) {
            return Err(DefinitionError::OutOfRange {
                owner: self.name.clone(),
                field: "hunger_threshold",
                value: self.hunger_threshold,
                max: self.max_hunger,
            });
        }
        Ok(())
    }
}

/// A set of lines for one species and trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtLine {
    pub species: String,
    pub trigger: ThoughtTrigger,
    pub lines: Vec<String>,
}

/// Thought lines, looked up by species and trigger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThoughtLibrary {
    #[serde(default)]
    pub thoughts: Vec<ThoughtLine>,
}

impl ThoughtLibrary {
    pub fn new(thoughts: Vec<ThoughtLine>) -> Self {
        Self { thoughts }
    }

    /// Lines registered for a species, keeping only that species' entries.
    pub fn for_species(&self, species: &str) -> ThoughtLibrary {
        ThoughtLibrary {
            thoughts: self
                .thoughts
                .iter()
                .filter(|t| t.species.eq_ignore_ascii_case(species))
                .cloned()
                .collect(),
        }
    }

    /// Pick a random line for the trigger, if any exist.
    pub fn pick<R: Rng + ?Sized>(&self, species: &str, trigger: ThoughtTrigger, rng: &mut R) -> Option<String> {
        let candidates: Vec<&String> = self
            .thoughts
            .iter()
            .filter(|t| t.trigger == trigger && t.species.eq_ignore_ascii_case(species))
            .flat_map(|t| t.lines.iter())
            .collect();
        candidates.choose(rng).map(|line| (*line).clone())
    }

    pub fn is_empty(&self) -> bool {
        self.thoughts.is_empty()
    }
}

/// Everything an agent of one species needs to know about itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimalDefinition {
    /// Species name
    pub species: String,
    /// Name of the diet this species eats from
    #[serde(rename = "diet")]
    pub diet_name: String,
    pub max_health: f32,
    /// Tiles per tick
    pub movement_speed: f32,

    pub thinking_tick_interval: u32,
    pub search_radius_tiles: i32,
    /// Exact Manhattan distance an animal eats from
    pub eat_distance_tiles: i32,
    pub eat_duration_ticks: u32,

    /// Percent chance (0-100) to pause instead of stepping while wandering
    pub wander_pause_tick_chance: u32,
    pub min_wander_pause_ticks: u32,
    pub max_wander_pause_ticks: u32,

    pub starvation_damage_tick_interval: u32,
    pub damage_per_starvation_tick: f32,
    pub damage_flash_ticks: u32,
    pub death_fade_ticks: u32,

    pub min_poop_delay_ticks: u32,
    pub max_poop_delay_ticks: u32,
    pub poop_cooldown_ticks: u32,
    /// Number of visual variants a dropping can take
    pub poop_variants: u32,

    pub thought_cooldown_ticks: u32,

    /// Resolved from `diet_name` by the species library
    #[serde(skip)]
    pub diet: Option<Arc<Diet>>,
    /// Resolved from the global thought library
    #[serde(skip)]
    pub thoughts: ThoughtLibrary,
}

impl Default for AnimalDefinition {
    fn default() -> Self {
        Self {
            species: "animal".to_string(),
            diet_name: String::new(),
            max_health: 10.0,
            movement_speed: 2.0,
            thinking_tick_interval: 3,
            search_radius_tiles: 5,
            eat_distance_tiles: 1,
            eat_duration_ticks: 3,
            wander_pause_tick_chance: 30,
            min_wander_pause_ticks: 1,
            max_wander_pause_ticks: 4,
            starvation_damage_tick_interval: 4,
            damage_per_starvation_tick: 2.0,
            damage_flash_ticks: 1,
            death_fade_ticks: 3,
            min_poop_delay_ticks: 10,
            max_poop_delay_ticks: 20,
            poop_cooldown_ticks: 2,
            poop_variants: 3,
            thought_cooldown_ticks: 10,
            diet: None,
            thoughts: ThoughtLibrary::default(),
        }
    }
}

impl AnimalDefinition {
    /// Attach a resolved diet.
    pub fn with_diet(mut self, diet: Diet) -> Self {
        self.diet_name = diet.name.clone();
        self.diet = Some(Arc::new(diet));
        self
    }

    pub fn diet(&self) -> Result<&Diet, DefinitionError> {
        self.diet.as_deref().ok_or_else(|| self.missing_diet())
    }

    /// The resolved diet as a shared handle; every animal of a species
    /// points at the same one.
    pub fn shared_diet(&self) -> Result<Arc<Diet>, DefinitionError> {
        self.diet.clone().ok_or_else(|| self.missing_diet())
    }

    fn missing_diet(&self) -> DefinitionError {
        DefinitionError::MissingDiet {
            species: self.species.clone(),
            diet: self.diet_name.clone(),
        }
    }

    /// Reject definitions an agent cannot run with.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let owner = self.species.as_str();
        self.diet()?.validate()?;

        positive(owner, "max_health", self.max_health)?;
        positive(owner, "movement_speed", self.movement_speed)?;
        positive(owner, "damage_per_starvation_tick", self.damage_per_starvation_tick)?;
        positive(owner, "search_radius_tiles", self.search_radius_tiles as f32)?;
        positive(owner, "eat_distance_tiles", self.eat_distance_tiles as f32)?;

        non_zero(owner, "thinking_tick_interval", self.thinking_tick_interval)?;
        non_zero(owner, "eat_duration_ticks", self.eat_duration_ticks)?;
        non_zero(owner, "starvation_damage_tick_interval", self.starvation_damage_tick_interval)?;
        non_zero(owner, "death_fade_ticks", self.death_fade_ticks)?;
        non_zero(owner, "poop_variants", self.poop_variants)?;

        range(owner, "wander_pause_ticks", self.min_wander_pause_ticks, self.max_wander_pause_ticks)?;
        range(owner, "poop_delay_ticks", self.min_poop_delay_ticks, self.max_poop_delay_ticks)?;

        if self.wander_pause_tick_chance > 100 {
            return Err(DefinitionError::OutOfRange {
                owner: owner.to_string(),
                field: "wander_pause_tick_chance",
                value: self.wander_pause_tick_chance as f32,
                max: 100.0,
            });
        }
        Ok(())
    }
}

fn positive(owner: &str, field: &'static str, value: f32) -> Result<(), DefinitionError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(DefinitionError::NotPositive {
            owner: owner.to_string(),
            field,
            value,
        })
    }
}

fn non_zero(owner: &str, field: &'static str, value: u32) -> Result<(), DefinitionError> {
    if value == 0 {
        Err(DefinitionError::ZeroInterval {
            owner: owner.to_string(),
            field,
        })
    } else {
        Ok(())
    }
}

fn range(owner: &str, field: &'static str, min: u32, max: u32) -> Result<(), DefinitionError> {
    if min > max {
        Err(DefinitionError::InvalidRange {
            owner: owner.to_string(),
            field,
            min,
            max,
        })
    } else {
        Ok(())
    }
}

/// Species definitions with their diets resolved
#[derive(Debug, Clone, Default)]
pub struct SpeciesLibrary {
    species: HashMap<String, Arc<AnimalDefinition>>,
    /// Species that failed to resolve, with the reason
    rejected: Vec<(String, DefinitionError)>,
}

impl SpeciesLibrary {
    /// Resolve diets and thoughts. A species whose definition does not
    /// validate is kept out of the library and recorded in `rejected`.
    pub fn build(
        definitions: &[AnimalDefinition],
        diets: &[Diet],
        thoughts: &ThoughtLibrary,
    ) -> Result<Self, DefinitionError> {
        let mut diet_index: HashMap<&str, Arc<Diet>> = HashMap::new();
        for diet in diets {
            if diet_index.insert(diet.name.as_str(), Arc::new(diet.clone())).is_some() {
                return Err(DefinitionError::Duplicate(diet.name.clone()));
            }
        }

        let mut library = SpeciesLibrary::default();
        for definition in definitions {
            if library.species.contains_key(&definition.species) {
                return Err(DefinitionError::Duplicate(definition.species.clone()));
            }
            let mut resolved = definition.clone();
            resolved.diet = diet_index.get(definition.diet_name.as_str()).cloned();
            resolved.thoughts = thoughts.for_species(&definition.species);

            match resolved.validate() {
                Ok(()) => {
                    library.species.insert(resolved.species.clone(), Arc::new(resolved));
                }
                Err(e) => library.rejected.push((definition.species.clone(), e)),
            }
        }
        Ok(library)
    }

    pub fn get(&self, species: &str) -> Result<Arc<AnimalDefinition>, DefinitionError> {
        if let Some((_, e)) = self.rejected.iter().find(|(name, _)| name == species) {
            return Err(e.clone());
        }
        self.species
            .get(species)
            .cloned()
            .ok_or_else(|| DefinitionError::MissingDefinition(species.to_string()))
    }

    pub fn rejected(&self) -> &[(String, DefinitionError)] {
        &self.rejected
    }

    /// Valid species names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.species.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
