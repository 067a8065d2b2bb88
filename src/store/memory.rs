//! In-memory record store.
//!
//! Backs offline runs from a JSON snapshot and doubles as the store
//! used throughout the unit tests.

use super::{RecordStore, StoreError};
use crate::models::{HazardReport, RecordKind, Sighting, Task};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// A snapshot of all three record collections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pub sightings: Vec<Sighting>,
    #[serde(default)]
    pub hazards: Vec<HazardReport>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Kinds whose queries fail on purpose.
    #[serde(skip)]
    failing: HashSet<RecordKind>,
}

impl MemoryStore {
    #[cfg(test)]
    pub fn new(sightings: Vec<Sighting>, hazards: Vec<HazardReport>, tasks: Vec<Task>) -> Self {
        Self {
            sightings,
            hazards,
            tasks,
            failing: HashSet::new(),
        }
    }

    /// Load a snapshot of the form `{"sightings": [...], "hazards": [...], "tasks": [...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path.display()))?;

        let store: MemoryStore = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file: {}", path.display()))?;

        Ok(store)
    }

    /// Make every query for `kind` fail.
    #[cfg(test)]
    pub fn fail_on(mut self, kind: RecordKind) -> Self {
        self.failing.insert(kind);
        self
    }

    fn check(&self, kind: RecordKind) -> Result<(), StoreError> {
        if self.failing.contains(&kind) {
            return Err(StoreError::Unavailable(format!("{} query disabled", kind)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn sightings_since(&self, since: DateTime<Utc>) -> Result<Vec<Sighting>, StoreError> {
        self.check(RecordKind::Sightings)?;
        Ok(self
            .sightings
            .iter()
            .filter(|s| s.created_at >= since)
            .cloned()
            .collect())
    }

    async fn hazards_since(&self, since: DateTime<Utc>) -> Result<Vec<HazardReport>, StoreError> {
        self.check(RecordKind::Hazards)?;
        Ok(self
            .hazards
            .iter()
            .filter(|h| h.created_at >= since)
            .cloned()
            .collect())
    }

    async fn tasks_since(&self, since: DateTime<Utc>) -> Result<Vec<Task>, StoreError> {
        self.check(RecordKind::Tasks)?;
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.created_at >= since)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use chrono::TimeZone;
    use std::io::Write;

    #[tokio::test]
    async fn test_filter_is_inclusive_of_start() {
        let start = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let store = MemoryStore::new(
            vec![
                Sighting {
                    species: "galeb".to_string(),
                    severity: Severity::High,
                    created_at: start,
                },
                Sighting {
                    species: "vrana".to_string(),
                    severity: Severity::Low,
                    created_at: start - chrono::Duration::seconds(1),
                },
            ],
            vec![],
            vec![],
        );

        let rows = store.sightings_since(start).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].species, "galeb");
    }

    #[tokio::test]
    async fn test_fail_on_only_affects_that_kind() {
        let store = MemoryStore::default().fail_on(RecordKind::Hazards);
        let since = Utc::now();

        assert!(store.hazards_since(since).await.is_err());
        assert!(store.sightings_since(since).await.unwrap().is_empty());
        assert!(store.tasks_since(since).await.unwrap().is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "sightings": [
                    {{"species": "galeb", "severity": "medium", "created_at": "2026-06-01T10:00:00Z"}}
                ],
                "tasks": [{{"created_at": "2026-06-02T10:00:00Z", "status": "open"}}]
            }}"#
        )
        .unwrap();

        let store = MemoryStore::from_json_file(file.path()).unwrap();
        assert_eq!(store.sightings.len(), 1);
        assert!(store.hazards.is_empty());
        assert_eq!(store.tasks.len(), 1);
    }

    #[test]
    fn test_demo_snapshot_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/snapshot.json");
        let store = MemoryStore::from_json_file(&path).unwrap();
        assert_eq!(store.sightings.len(), 7);
        assert_eq!(store.hazards.len(), 2);
        assert_eq!(store.tasks.len(), 1);
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = MemoryStore::from_json_file(Path::new("/nonexistent/snapshot.json"));
        assert!(result.is_err());
    }
}
