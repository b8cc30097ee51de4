//! Intervention System
//!
//! Runtime commands against live animals: damage, status effects, zone speed
//! multipliers, forced thoughts and new spawns. Commands arrive as JSON files
//! dropped into a watched directory and are applied at the start of the next
//! tick.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use fauna_events::ThoughtTrigger;

use crate::components::{EffectRegistry, SimClock};
use crate::controller::{AgentContext, AnimalController};
use crate::events::TickEvents;
use crate::grid::GridPosition;
use crate::movement::is_valid_speed_factor;
use crate::setup::{spawn_food, spawn_species, SpawnError};
use crate::SimRng;

/// Default directory to watch for intervention files
pub const INTERVENTIONS_DIR: &str = "interventions";

/// Types of interventions that can be applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InterventionType {
    /// Hurt an animal; damage resistance applies
    Damage { agent: u64, amount: f32 },
    ApplyStatusEffect { agent: u64, effect: String },
    RemoveStatusEffect { agent: u64, effect: String },
    /// Enter a speed zone
    ApplySpeedMultiplier { agent: u64, factor: f32 },
    /// Leave a speed zone
    RemoveSpeedMultiplier { agent: u64, factor: f32 },
    CancelAction { agent: u64 },
    ShowThought { agent: u64, trigger: ThoughtTrigger },
    SpawnAnimal { species: String, x: i32, y: i32 },
    SpawnFood { food_type: String, x: i32, y: i32 },
}

/// A complete intervention request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    /// Unique ID for this intervention
    pub id: String,
    /// Description of why this intervention is being made
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// The actual intervention to apply
    pub intervention: InterventionType,
}

/// Why an intervention could not be applied
#[derive(Debug, Error)]
pub enum InterventionError {
    #[error("no live animal with id {0}")]
    UnknownAgent(u64),

    #[error("unknown status effect '{0}'")]
    UnknownEffect(String),

    #[error("speed factor {0} must be finite and non-negative")]
    InvalidSpeedFactor(f32),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error("missing world resource {0}")]
    MissingResource(&'static str),
}

/// Resource for tracking pending interventions
#[derive(Resource, Debug, Default)]
pub struct PendingInterventions {
    /// (source file, intervention)
    pub interventions: Vec<(String, Intervention)>,
    /// Files to delete once their intervention has been applied
    pub applied: Vec<PathBuf>,
}

impl PendingInterventions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: impl Into<String>, intervention: Intervention) {
        self.interventions.push((source.into(), intervention));
    }
}

/// Load every `*.json` intervention file in `dir`, in file name order.
/// Unreadable or malformed files are skipped with a warning.
pub fn scan_interventions(dir: &Path, pending: &mut PendingInterventions) {
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "could not create interventions directory");
            return;
        }
    }

    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();

    for path in paths {
        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Intervention>(&content) {
                Ok(intervention) => {
                    pending.push(path.display().to_string(), intervention);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "could not parse intervention file"),
            },
            Err(e) => warn!(path = %path.display(), error = %e, "could not read intervention file"),
        }
    }
}

/// Delete the files of interventions that were applied
pub fn remove_applied_files(pending: &mut PendingInterventions) {
    for path in pending.applied.drain(..) {
        if let Err(e) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "could not delete intervention file");
        }
    }
}

/// Exclusive system to apply pending interventions
pub fn apply_interventions(world: &mut World) {
    let interventions: Vec<_> = match world.get_resource_mut::<PendingInterventions>() {
        Some(mut pending) => pending.interventions.drain(..).collect(),
        None => return,
    };
    if interventions.is_empty() {
        return;
    }

    let mut applied = Vec::new();
    for (source, intervention) in interventions {
        match apply_intervention(world, &intervention.intervention) {
            Ok(()) => {
                info!(id = %intervention.id, reason = ?intervention.reason, "intervention applied");
                if Path::new(&source).exists() {
                    applied.push(PathBuf::from(source));
                }
            }
            Err(e) => warn!(id = %intervention.id, error = %e, "intervention rejected"),
        }
    }

    if let Some(mut pending) = world.get_resource_mut::<PendingInterventions>() {
        pending.applied.extend(applied);
    }
}

/// Apply a single intervention
pub fn apply_intervention(world: &mut World, intervention: &InterventionType) -> Result<(), InterventionError> {
    match intervention {
        InterventionType::Damage { agent, amount } => {
            with_agent(world, *agent, |controller, ctx| {
                controller.take_damage(*amount, ctx);
            })
        }
        InterventionType::ApplyStatusEffect { agent, effect } => {
            let definition = world
                .get_resource::<EffectRegistry>()
                .and_then(|registry| registry.get(effect))
                .ok_or_else(|| InterventionError::UnknownEffect(effect.clone()))?;
            with_agent(world, *agent, |controller, _| controller.apply_status_effect(definition))
        }
        InterventionType::RemoveStatusEffect { agent, effect } => {
            with_agent(world, *agent, |controller, _| {
                controller.remove_status_effect(effect);
            })
        }
        InterventionType::ApplySpeedMultiplier { agent, factor } => {
            if !is_valid_speed_factor(*factor) {
                return Err(InterventionError::InvalidSpeedFactor(*factor));
            }
            with_agent(world, *agent, |controller, _| {
                controller.apply_speed_multiplier(*factor);
            })
        }
        InterventionType::RemoveSpeedMultiplier { agent, factor } => {
            with_agent(world, *agent, |controller, _| controller.remove_speed_multiplier(*factor))
        }
        InterventionType::CancelAction { agent } => {
            with_agent(world, *agent, |controller, _| controller.cancel_current_action())
        }
        InterventionType::ShowThought { agent, trigger } => {
            with_agent(world, *agent, |controller, ctx| {
                controller.show_thought(*trigger, ctx);
            })
        }
        InterventionType::SpawnAnimal { species, x, y } => {
            let mut rng = world
                .remove_resource::<SimRng>()
                .ok_or(InterventionError::MissingResource("SimRng"))?;
            let result = spawn_species(world, species, GridPosition::new(*x, *y), None, &mut rng.0);
            world.insert_resource(rng);
            result.map(|_| ()).map_err(Into::into)
        }
        InterventionType::SpawnFood { food_type, x, y } => {
            spawn_food(world, food_type, GridPosition::new(*x, *y), None)?;
            Ok(())
        }
    }
}

fn find_agent(world: &mut World, agent: u64) -> Option<Entity> {
    world
        .query::<(Entity, &AnimalController)>()
        .iter(world)
        .find(|(entity, controller)| entity.to_bits() == agent && !controller.is_removed())
        .map(|(entity, _)| entity)
}

/// Run `f` against a live animal with the shared RNG and event buffer.
fn with_agent<T>(
    world: &mut World,
    agent: u64,
    f: impl FnOnce(&mut AnimalController, &mut AgentContext<'_, SmallRng, TickEvents>) -> T,
) -> Result<T, InterventionError> {
    let entity = find_agent(world, agent).ok_or(InterventionError::UnknownAgent(agent))?;
    let tick = world.get_resource::<SimClock>().map(|c| c.tick).unwrap_or(0);

    // Take the RNG and event buffer out to avoid borrow conflicts
    let mut rng = world
        .remove_resource::<SimRng>()
        .ok_or(InterventionError::MissingResource("SimRng"))?;
    let Some(mut events) = world.remove_resource::<TickEvents>() else {
        world.insert_resource(rng);
        return Err(InterventionError::MissingResource("TickEvents"));
    };

    let result = match world.get_mut::<AnimalController>(entity) {
        Some(mut controller) => {
            let mut ctx = AgentContext::new(tick, &mut rng.0, &mut events);
            Ok(f(&mut controller, &mut ctx))
        }
        None => Err(InterventionError::UnknownAgent(agent)),
    };

    world.insert_resource(events);
    world.insert_resource(rng);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{SimSettings, SpeciesRegistry};
    use crate::definition::tests::{rabbit, rabbit_diet};
    use crate::definition::{SpeciesLibrary, ThoughtLibrary};
    use crate::grid::GridWorld;
    use crate::status::StatusEffectDefinition;
    use rand::SeedableRng;

    fn setup_world() -> (World, Entity) {
        let mut world = World::new();
        let grid = GridWorld::new(6, 6);
        world.insert_resource(SimSettings {
            hunger_tick_interval: 1,
            view_bounds: grid.bounds(),
            dropping_lifetime_ticks: 100,
        });
        world.insert_resource(grid);
        world.insert_resource(SimClock::new());
        world.insert_resource(TickEvents::new());
        world.insert_resource(SimRng(SmallRng::seed_from_u64(2)));
        world.insert_resource(EffectRegistry::new(vec![StatusEffectDefinition {
            id: "mud".to_string(),
            additional_move_ticks: 2,
            ..StatusEffectDefinition::default()
        }]));
        let library = SpeciesLibrary::build(&[rabbit()], &[rabbit_diet()], &ThoughtLibrary::default()).unwrap();
        world.insert_resource(SpeciesRegistry(library));

        let mut rng = world.remove_resource::<SimRng>().unwrap();
        let entity = spawn_species(&mut world, "rabbit", GridPosition::new(2, 2), None, &mut rng.0).unwrap();
        world.insert_resource(rng);
        (world, entity)
    }

    #[test]
    fn test_intervention_parsing() {
        let json = r#"{
            "id": "int_001",
            "reason": "rockfall",
            "intervention": {
                "type": "damage",
                "agent": 42,
                "amount": 3.5
            }
        }"#;

        let intervention: Intervention = serde_json::from_str(json).unwrap();
        assert_eq!(intervention.id, "int_001");
        assert_eq!(
            intervention.intervention,
            InterventionType::Damage {
                agent: 42,
                amount: 3.5
            }
        );

        let json = r#"{"id": "t", "intervention": {"type": "show_thought", "agent": 1, "trigger": "health_low"}}"#;
        let intervention: Intervention = serde_json::from_str(json).unwrap();
        assert!(matches!(
            intervention.intervention,
            InterventionType::ShowThought {
                trigger: ThoughtTrigger::HealthLow,
                ..
            }
        ));
    }

    #[test]
    fn test_damage_and_effects() {
        let (mut world, entity) = setup_world();
        let agent = entity.to_bits();

        apply_intervention(&mut world, &InterventionType::Damage { agent, amount: 4.0 }).unwrap();
        apply_intervention(
            &mut world,
            &InterventionType::ApplyStatusEffect {
                agent,
                effect: "mud".to_string(),
            },
        )
        .unwrap();

        let controller = world.get::<AnimalController>(entity).unwrap();
        assert_eq!(controller.current_health(), 6.0);
        assert!(controller.has_status_effect("mud"));

        let unknown = apply_intervention(
            &mut world,
            &InterventionType::ApplyStatusEffect {
                agent,
                effect: "ice".to_string(),
            },
        );
        assert!(matches!(unknown, Err(InterventionError::UnknownEffect(_))));

        let negative = apply_intervention(
            &mut world,
            &InterventionType::ApplySpeedMultiplier { agent, factor: -1.0 },
        );
        assert!(matches!(negative, Err(InterventionError::InvalidSpeedFactor(_))));
        let controller = world.get::<AnimalController>(entity).unwrap();
        assert_eq!(controller.movement().zone_multiplier(), 1.0);

        let missing = apply_intervention(&mut world, &InterventionType::CancelAction { agent: 999_999 });
        assert!(matches!(missing, Err(InterventionError::UnknownAgent(999_999))));
        assert!(world.get_resource::<SimRng>().is_some());
        assert!(world.get_resource::<TickEvents>().is_some());
    }

    #[test]
    fn test_apply_interventions_system() {
        let (mut world, entity) = setup_world();
        let mut pending = PendingInterventions::new();
        pending.push(
            "inline",
            Intervention {
                id: "spawn".to_string(),
                reason: None,
                intervention: InterventionType::SpawnFood {
                    food_type: "carrot".to_string(),
                    x: 4,
                    y: 4,
                },
            },
        );
        pending.push(
            "inline",
            Intervention {
                id: "zone".to_string(),
                reason: None,
                intervention: InterventionType::ApplySpeedMultiplier {
                    agent: entity.to_bits(),
                    factor: 0.5,
                },
            },
        );
        world.insert_resource(pending);

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_interventions);
        schedule.run(&mut world);

        assert_eq!(world.resource::<GridWorld>().food_count(), 1);
        let controller = world.get::<AnimalController>(entity).unwrap();
        assert_eq!(controller.movement().zone_multiplier(), 0.5);
        let pending = world.resource::<PendingInterventions>();
        assert!(pending.interventions.is_empty());
        assert!(pending.applied.is_empty());
    }

    #[test]
    fn test_scan_and_remove_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"id": "a", "intervention": {"type": "cancel_action", "agent": 1}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("b.json"), "not json").unwrap();
        fs::write(dir.path().join("c.txt"), "ignored").unwrap();

        let mut pending = PendingInterventions::new();
        scan_interventions(dir.path(), &mut pending);
        assert_eq!(pending.interventions.len(), 1);
        assert_eq!(pending.interventions[0].1.id, "a");

        pending.applied.push(dir.path().join("a.json"));
        remove_applied_files(&mut pending);
        assert!(!dir.path().join("a.json").exists());
        assert!(dir.path().join("b.json").exists());
    }
}
