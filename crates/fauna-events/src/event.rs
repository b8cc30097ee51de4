//! Event Types
//!
//! Records emitted by animal agents as they move, eat, digest and die.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid cell as it appears in event output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub x: i32,
    pub y: i32,
}

impl CellRef {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Primary event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Lifecycle,
    Foraging,
    Feeding,
    Digestion,
    Thought,
    Damage,
}

impl EventType {
    /// Returns all event type variants.
    pub fn all() -> &'static [EventType] {
        &[
            EventType::Lifecycle,
            EventType::Foraging,
            EventType::Feeding,
            EventType::Digestion,
            EventType::Thought,
            EventType::Damage,
        ]
    }
}

/// What finished an animal off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    /// Health ran out on a starvation damage tick
    Starvation,
    /// Damage dealt by an outside source (hazard, predator)
    Damage,
    /// Per-tick damage from an active status effect
    StatusEffect,
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathCause::Starvation => write!(f, "starvation"),
            DeathCause::Damage => write!(f, "damage"),
            DeathCause::StatusEffect => write!(f, "status_effect"),
        }
    }
}

/// Situations that can pop a thought bubble over an animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtTrigger {
    Hungry,
    Eating,
    HealthLow,
    Fleeing,
    Pooping,
}

/// Event payload, tagged by `kind` in the serialized form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Agent placed on the grid
    Spawned { cell: CellRef },
    /// A food item was chosen as the foraging target
    TargetAcquired {
        food: u64,
        food_type: String,
        cell: CellRef,
    },
    /// The foraging target disappeared before it could be eaten
    TargetLost { food: u64 },
    /// Eating began next to the food item
    StartedEating { food: u64, food_type: String },
    /// Eating completed and the food item was consumed
    FinishedEating {
        food: u64,
        food_type: String,
        satiation: f32,
        hunger: f32,
    },
    /// A dropping was left behind
    Pooped { cell: CellRef, variant: u32 },
    /// A thought bubble should be displayed
    ThoughtShown {
        trigger: ThoughtTrigger,
        line: String,
    },
    /// Health was reduced
    Damaged { amount: f32, health: f32 },
    /// Health reached zero; the fade countdown started
    Died { cause: DeathCause, cell: CellRef },
    /// Fade finished; the agent left the simulation
    Removed,
}

impl EventKind {
    /// Category used for filtering and summaries.
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::Spawned { .. } | EventKind::Died { .. } | EventKind::Removed => {
                EventType::Lifecycle
            }
            EventKind::TargetAcquired { .. } | EventKind::TargetLost { .. } => EventType::Foraging,
            EventKind::StartedEating { .. } | EventKind::FinishedEating { .. } => {
                EventType::Feeding
            }
            EventKind::Pooped { .. } => EventType::Digestion,
            EventKind::ThoughtShown { .. } => EventType::Thought,
            EventKind::Damaged { .. } => EventType::Damage,
        }
    }
}

/// A single agent event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalEvent {
    /// Sequential id, assigned when the event is queued
    pub event_id: String,
    /// Simulation tick on which the event happened
    pub tick: u64,
    /// Stable bit pattern of the agent's entity handle
    pub agent: u64,
    pub species: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl AnimalEvent {
    pub fn new(tick: u64, agent: u64, species: impl Into<String>, kind: EventKind) -> Self {
        Self {
            event_id: String::new(),
            tick,
            agent,
            species: species.into(),
            kind,
        }
    }

    pub fn with_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = event_id.into();
        self
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }
}
