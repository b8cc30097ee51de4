//! Per-tick event buffer

use bevy_ecs::prelude::*;

use fauna_events::AnimalEvent;

/// Anything an agent can report events to
pub trait EventSink {
    fn emit(&mut self, event: AnimalEvent);
}

impl EventSink for Vec<AnimalEvent> {
    fn emit(&mut self, event: AnimalEvent) {
        self.push(event);
    }
}

/// Resource collecting the events generated during the current tick
#[derive(Resource, Debug)]
pub struct TickEvents {
    pub events: Vec<AnimalEvent>,
    next_event_id: u64,
}

impl Default for TickEvents {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            next_event_id: 1,
        }
    }
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate_id(&mut self) -> String {
        let id = format!("evt_{:08}", self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn push(&mut self, event: AnimalEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<AnimalEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for TickEvents {
    /// Assigns the next sequential id.
    fn emit(&mut self, event: AnimalEvent) {
        let id = self.generate_id();
        self.push(event.with_id(id));
    }
}
