//! Event Logger
//!
//! Append-only JSONL event logging.

use bevy_ecs::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::warn;

use fauna_events::AnimalEvent;

/// Resource for logging events to a JSONL file
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that only counts events
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    pub fn is_writing(&self) -> bool {
        self.writer.is_some()
    }

    /// Get the current event count
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Log an event to the file
    pub fn log(&mut self, event: &AnimalEvent) -> std::io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    /// Log multiple events
    pub fn log_batch(&mut self, events: &[AnimalEvent]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to flush event logger");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fauna_events::{CellRef, DeathCause, EventKind};
    use std::io::BufRead;

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut logger = EventLogger::new(&path).unwrap();
        let event = AnimalEvent::new(
            42,
            3,
            "rabbit",
            EventKind::Died {
                cause: DeathCause::Starvation,
                cell: CellRef::new(4, 5),
            },
        )
        .with_id("evt_00000001");

        logger.log(&event).unwrap();
        logger
            .log_batch(&[AnimalEvent::new(45, 3, "rabbit", EventKind::Removed).with_id("evt_00000002")])
            .unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let reader = std::io::BufReader::new(file);
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines.len(), 2);

        let parsed: AnimalEvent = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed, event);
        assert!(lines[1].contains("\"kind\":\"removed\""));
    }

    #[test]
    fn test_null_logger() {
        let mut logger = EventLogger::null();
        assert!(!logger.is_writing());

        logger
            .log(&AnimalEvent::new(1, 1, "fox", EventKind::Removed))
            .unwrap();
        assert_eq!(logger.event_count(), 1);
    }
}
