//! Event plumbing
//!
//! Agents emit [`AnimalEvent`]s through an [`EventSink`]; the ECS shell
//! buffers them per tick in [`TickEvents`] and writes them out with the
//! [`EventLogger`].

pub mod logger;
pub mod queue;

pub use fauna_events::AnimalEvent;
pub use logger::EventLogger;
pub use queue::{EventSink, TickEvents};
