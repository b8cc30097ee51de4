//! Configuration System
//!
//! Loads the world, food, diet, species and status effect tables from a TOML
//! file so tuning happens without recompiling.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::definition::{AnimalDefinition, DefinitionError, Diet, SpeciesLibrary, ThoughtLibrary, ThoughtLine};
use crate::grid::{GridBounds, GridPosition};
use crate::status::StatusEffectDefinition;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "fauna.toml";

/// Errors loading or checking configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaunaConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub foods: Vec<FoodConfig>,
    #[serde(default)]
    pub diets: Vec<Diet>,
    #[serde(default)]
    pub species: Vec<AnimalDefinition>,
    #[serde(default)]
    pub spawns: Vec<SpawnConfig>,
    #[serde(default)]
    pub status_effects: Vec<StatusEffectDefinition>,
    #[serde(default)]
    pub thoughts: Vec<ThoughtLine>,
}

/// World and clock settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub ticks: u64,
    pub seed: u64,
    /// Ticks between hunger increases, shared by every animal
    pub hunger_tick_interval: u32,
    pub grid_width: i32,
    pub grid_height: i32,
    pub cell_size: f32,
    /// Width of the strip around the grid that lies outside the view
    pub view_margin: i32,
    /// Impassable tiles as `[x, y]`
    pub blocked_tiles: Vec<[i32; 2]>,
    /// Ticks a dropping stays on the ground before it is cleared
    pub dropping_lifetime_ticks: u64,
    pub summary_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks: 1000,
            seed: 42,
            hunger_tick_interval: 1,
            grid_width: 32,
            grid_height: 24,
            cell_size: 1.0,
            view_margin: 0,
            blocked_tiles: Vec::new(),
            dropping_lifetime_ticks: 200,
            summary_interval: 100,
        }
    }
}

impl SimulationConfig {
    /// The visible part of the grid. Animals spawned outside it walk in.
    pub fn view_bounds(&self) -> GridBounds {
        let m = self.view_margin.max(0);
        GridBounds::new(
            GridPosition::new(m, m),
            GridPosition::new(self.grid_width - 1 - m, self.grid_height - 1 - m),
        )
    }

    pub fn blocked_cells(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.blocked_tiles.iter().map(|[x, y]| GridPosition::new(*x, *y))
    }
}

/// A food type and how many to scatter at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodConfig {
    pub name: String,
    #[serde(default)]
    pub count: u32,
    /// When set, satiation is `base_nutrition * potency` for every diet
    #[serde(default)]
    pub base_nutrition: Option<f32>,
    #[serde(default = "default_potency")]
    pub potency: f32,
}

fn default_potency() -> f32 {
    1.0
}

/// How many animals of a species to place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub species: String,
    pub count: u32,
    /// Spawn in the margin outside the view and walk into it
    #[serde(default)]
    pub from_edge: bool,
}

impl FaunaConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: FaunaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses the built-in default configuration.
    pub fn default_config() -> Result<Self, ConfigError> {
        Self::from_str(&default_config_toml())
    }

    /// World-level checks. Individual species are checked when the species
    /// library is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        if sim.grid_width <= 0 || sim.grid_height <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1 (got {}x{})",
                sim.grid_width, sim.grid_height
            )));
        }
        if sim.hunger_tick_interval == 0 {
            return Err(ConfigError::Invalid("hunger_tick_interval must be at least 1".into()));
        }
        if sim.dropping_lifetime_ticks == 0 {
            return Err(ConfigError::Invalid("dropping_lifetime_ticks must be at least 1".into()));
        }
        if sim.view_margin < 0 || sim.view_margin * 2 >= sim.grid_width.min(sim.grid_height) {
            return Err(ConfigError::Invalid(format!(
                "view_margin {} leaves no visible area",
                sim.view_margin
            )));
        }
        for diet in &self.diets {
            diet.validate()?;
        }
        for food in &self.foods {
            if food.potency < 0.0 {
                return Err(ConfigError::Invalid(format!("food '{}' has negative potency", food.name)));
            }
        }
        Ok(())
    }

    /// Resolve diets and thoughts for every species.
    pub fn species_library(&self) -> Result<SpeciesLibrary, ConfigError> {
        let thoughts = ThoughtLibrary::new(self.thoughts.clone());
        Ok(SpeciesLibrary::build(&self.species, &self.diets, &thoughts)?)
    }

    pub fn status_effect(&self, id: &str) -> Option<&StatusEffectDefinition> {
        self.status_effects.iter().find(|e| e.id == id)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Returns the default configuration as a TOML string.
pub fn default_config_toml() -> String {
    r#"# Fauna Simulation Configuration

[simulation]
ticks = 1000
seed = 42
hunger_tick_interval = 2
grid_width = 32
grid_height = 24
view_margin = 2
blocked_tiles = [[12, 8], [12, 9], [12, 10], [12, 11], [20, 14], [21, 14]]
dropping_lifetime_ticks = 150
summary_interval = 100

[[foods]]
name = "carrot"
count = 12

[[foods]]
name = "grass"
count = 30

[[foods]]
name = "golden_apple"
count = 2
base_nutrition = 30.0
potency = 1.5

[[diets]]
name = "herbivore"
max_hunger = 20.0
hunger_increase_rate = 0.5
hunger_threshold = 10.0
foods = [
    { food_type = "carrot", satiation = 8.0, priority = 2.0 },
    { food_type = "grass", satiation = 4.0, priority = 1.0 },
    { food_type = "golden_apple", satiation = 10.0, priority = 3.0 },
]

[[diets]]
name = "grazer"
max_hunger = 30.0
hunger_increase_rate = 0.5
hunger_threshold = 12.0
foods = [
    { food_type = "grass", satiation = 6.0, priority = 2.0 },
]

[[species]]
species = "rabbit"
diet = "herbivore"
max_health = 10.0
movement_speed = 2.0
thinking_tick_interval = 3
search_radius_tiles = 5
eat_distance_tiles = 1
eat_duration_ticks = 3
wander_pause_tick_chance = 30
min_wander_pause_ticks = 1
max_wander_pause_ticks = 4
starvation_damage_tick_interval = 4
damage_per_starvation_tick = 2.0
death_fade_ticks = 3
min_poop_delay_ticks = 10
max_poop_delay_ticks = 20
poop_cooldown_ticks = 2
thought_cooldown_ticks = 10

[[species]]
species = "deer"
diet = "grazer"
max_health = 20.0
movement_speed = 0.75
thinking_tick_interval = 4
search_radius_tiles = 7
eat_distance_tiles = 1
eat_duration_ticks = 5
wander_pause_tick_chance = 50
starvation_damage_tick_interval = 6
damage_per_starvation_tick = 3.0
death_fade_ticks = 5

[[spawns]]
species = "rabbit"
count = 6

[[spawns]]
species = "rabbit"
count = 2
from_edge = true

[[spawns]]
species = "deer"
count = 3

[[status_effects]]
id = "mud"
display_name = "Muddy"
duration_ticks = 12
additional_move_ticks = 2

[[status_effects]]
id = "thorns"
display_name = "Thorns"
duration_ticks = 3
damage_per_tick = 0.5
can_stack = true
max_stacks = 3

[[thoughts]]
species = "rabbit"
trigger = "hungry"
lines = ["Carrots...", "Is that grass?", "So hungry"]

[[thoughts]]
species = "rabbit"
trigger = "eating"
lines = ["Nom nom", "Crunchy!"]

[[thoughts]]
species = "rabbit"
trigger = "health_low"
lines = ["I don't feel so good"]

[[thoughts]]
species = "deer"
trigger = "hungry"
lines = ["Fresh grass somewhere?"]
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_toml_parses() {
        let config = FaunaConfig::default_config().unwrap();
        assert_eq!(config.simulation.hunger_tick_interval, 2);
        assert_eq!(config.species.len(), 2);
        assert_eq!(config.diets.len(), 2);
        assert_eq!(config.simulation.blocked_cells().count(), 6);
        assert_eq!(config.simulation.dropping_lifetime_ticks, 150);

        let library = config.species_library().unwrap();
        assert_eq!(library.names(), vec!["deer", "rabbit"]);
        assert!(library.rejected().is_empty());

        let rabbit = library.get("rabbit").unwrap();
        assert_eq!(rabbit.thoughts.thoughts.len(), 3);
        assert_eq!(rabbit.diet.as_ref().map(|d| d.name.as_str()), Some("herbivore"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [simulation]
            seed = 7
        "#;
        let config = FaunaConfig::from_str(toml).unwrap();
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.ticks, 1000);
        assert_eq!(config.simulation.grid_width, 32);
        assert_eq!(config.simulation.dropping_lifetime_ticks, 200);
        assert!(config.species.is_empty());
    }

    #[test]
    fn test_species_fields_default() {
        let toml = r#"
            [[diets]]
            name = "herbivore"
            max_hunger = 10.0
            hunger_increase_rate = 1.0
            hunger_threshold = 5.0

            [[species]]
            species = "mouse"
            diet = "herbivore"
            movement_speed = 3.0
        "#;
        let config = FaunaConfig::from_str(toml).unwrap();
        let mouse = &config.species[0];
        assert_eq!(mouse.movement_speed, 3.0);
        assert_eq!(mouse.eat_duration_ticks, 3);
        assert_eq!(mouse.diet_name, "herbivore");
        assert!(mouse.diet.is_none());
    }

    #[test]
    fn test_invalid_world_is_rejected() {
        let toml = r#"
            [simulation]
            grid_width = 0
        "#;
        assert!(matches!(FaunaConfig::from_str(toml), Err(ConfigError::Invalid(_))));

        let toml = r#"
            [simulation]
            hunger_tick_interval = 0
        "#;
        assert!(matches!(FaunaConfig::from_str(toml), Err(ConfigError::Invalid(_))));

        let toml = r#"
            [simulation]
            dropping_lifetime_ticks = 0
        "#;
        assert!(matches!(FaunaConfig::from_str(toml), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_diet_is_rejected() {
        let toml = r#"
            [[diets]]
            name = "broken"
            max_hunger = 10.0
            hunger_increase_rate = 1.0
            hunger_threshold = 50.0
        "#;
        assert!(matches!(FaunaConfig::from_str(toml), Err(ConfigError::Definition(_))));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(FaunaConfig::from_str("[simulation"), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fauna.toml");
        std::fs::write(&path, default_config_toml()).unwrap();

        let config = FaunaConfig::from_file(&path).unwrap();
        assert_eq!(config.spawns.len(), 3);
        assert!(config.status_effect("mud").is_some());

        let missing = FaunaConfig::from_file(&dir.path().join("nope.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_view_bounds() {
        let sim = SimulationConfig {
            view_margin: 2,
            ..SimulationConfig::default()
        };
        let view = sim.view_bounds();
        assert_eq!(view.min, GridPosition::new(2, 2));
        assert_eq!(view.max, GridPosition::new(29, 21));
    }
}
