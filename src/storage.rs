use crate::domain::EventRecord;
use crate::error::{AggregatorError, Result};
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Persistence seam for the finalized catalog.
///
/// The store is a single-writer resource: one read to find records worth
/// preserving, one wholesale write at the end of a run.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Load the full record set from the prior run.
    async fn load(&self) -> Result<Vec<EventRecord>>;

    /// Replace the store with `records`. All or nothing: a failed write must
    /// not leave a half-written store behind.
    async fn save(&self, records: &[EventRecord]) -> Result<()>;
}

/// Flat-JSON store on disk, one array of records.
pub struct JsonEventStore {
    path: PathBuf,
}

impl JsonEventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl EventStore for JsonEventStore {
    async fn load(&self) -> Result<Vec<EventRecord>> {
        let content = fs::read_to_string(&self.path)?;
        let records: Vec<EventRecord> = serde_json::from_str(&content)?;
        debug!(count = records.len(), path = %self.path.display(), "loaded store");
        Ok(records)
    }

    async fn save(&self, records: &[EventRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(records)?;

        // Stage next to the target and rename so readers never observe a
        // partial store.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json)?;
        fs::rename(&staging, &self.path).map_err(|e| {
            let _ = fs::remove_file(&staging);
            AggregatorError::Store(format!(
                "failed to move staged store into place at {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!(count = records.len(), path = %self.path.display(), "saved store");
        Ok(())
    }
}

/// In-memory store for tests and dry runs.
pub struct InMemoryEventStore {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-seed the store, as if a prior run had persisted `records`.
    pub fn with_records(records: Vec<EventRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn load(&self) -> Result<Vec<EventRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn save(&self, records: &[EventRecord]) -> Result<()> {
        *self.records.lock().unwrap() = records.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventCandidate;
    use chrono::{NaiveDate, Utc};

    fn sample_record(source_name: &str) -> EventRecord {
        let start = NaiveDate::from_ymd_opt(2025, 11, 14)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        let candidate = EventCandidate::new(
            "Fall Jazz Night",
            "Live jazz quartet performs classic standards.",
            start,
            "https://example.com/events/1",
            source_name,
        );
        EventRecord::finalize(candidate, Utc::now())
    }

    #[tokio::test]
    async fn json_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonEventStore::new(dir.path().join("events.json"));

        let records = vec![sample_record("Lamplighter Brewing")];
        store.save(&records).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, records[0].id);
        assert_eq!(loaded[0].event.title, "Fall Jazz Night");
    }

    #[tokio::test]
    async fn missing_store_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonEventStore::new(dir.path().join("absent.json"));
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn save_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let store = JsonEventStore::new(&path);
        store.save(&[sample_record("Aeronaut Brewing")]).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("events.json");
        let store = JsonEventStore::new(&path);
        store.save(&[]).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn in_memory_store_replaces_wholesale() {
        let store = InMemoryEventStore::with_records(vec![sample_record("Old Source")]);
        store.save(&[sample_record("New Source")]).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].event.source_name, "New Source");
    }
}
