//! File-based event snapshot store.
//! The snapshot is one JSON array at `<dir>/events.json`; human-readable
//! and overwritten whole on every save.

use econwatch_core::{CalendarEvent, EconError, Result};
use std::path::{Path, PathBuf};

/// Durable snapshot of the last scraped calendar.
pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    /// Create a store rooted at the given directory.
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).ok();
        Self {
            path: dir.to_path_buf(),
        }
    }

    fn file(&self) -> PathBuf {
        self.path.join("events.json")
    }

    /// Overwrite the snapshot. Idempotent.
    pub fn save(&self, events: &[CalendarEvent]) -> Result<()> {
        let json = serde_json::to_string_pretty(events)
            .map_err(|e| EconError::Store(format!("Serialize error: {e}")))?;
        std::fs::write(self.file(), &json)
            .map_err(|e| EconError::Store(format!("Write error: {e}")))?;
        tracing::debug!("Saved {} events to {}", events.len(), self.file().display());
        Ok(())
    }

    /// Load the snapshot. Empty list when no snapshot exists; a snapshot
    /// that fails to read or parse is an error, not a silent empty list.
    pub fn load(&self) -> Result<Vec<CalendarEvent>> {
        let file = self.file();
        if !file.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&file)
            .map_err(|e| EconError::Store(format!("Read error: {e}")))?;
        serde_json::from_str(&json).map_err(|e| EconError::Store(format!("Parse error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> CalendarEvent {
        CalendarEvent {
            date: "Monday, January 6".into(),
            time: "8:30 am".into(),
            title: "Consumer price index".into(),
            period: "Dec".into(),
            actual: None,
            forecast: Some("0.3%".into()),
            previous: Some("0.2%".into()),
        }
    }

    #[test]
    fn missing_snapshot_is_empty() {
        let dir = std::env::temp_dir().join("econwatch-test-store-missing");
        std::fs::remove_dir_all(&dir).ok();
        let store = EventStore::new(&dir);
        assert!(store.load().unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join("econwatch-test-store-rw");
        let store = EventStore::new(&dir);
        store.save(&[sample_event()]).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![sample_event()]);
        // save is an overwrite, not an append
        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }
}
