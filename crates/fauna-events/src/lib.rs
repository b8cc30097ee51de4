//! Shared event types and serialization for the fauna simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod snapshot;

// Re-export event types
pub use event::*;

// Re-export snapshot types
pub use snapshot::{generate_snapshot_id, AnimalSnapshot, PopulationSnapshot};
