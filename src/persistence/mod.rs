//! Save/load persistence
//!
//! Features:
//! - One JSON document under a fixed storage key
//! - `_savedAt` stamped on every commit
//! - Pretty-printed JSON export named by capture time
//! - Import that only replaces the stored document once it parses

pub mod error;

pub use error::PersistenceError;

use crate::consts::{EXPORT_PREFIX, STORAGE_KEY};
use crate::form::FieldSnapshot;
use crate::platform::storage::KeyValueStore;
use crate::platform::time::{self, Millis};

/// The durable copy of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedDocument {
    snapshot: FieldSnapshot,
}

impl PersistedDocument {
    pub fn snapshot(&self) -> &FieldSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> FieldSnapshot {
        self.snapshot
    }

    pub fn saved_at(&self) -> Option<&str> {
        self.snapshot.saved_at()
    }
}

/// A file offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportFile {
    pub const MIME_TYPE: &'static str = "application/json";
}

/// Snapshot storage on top of a key-value backend
pub struct PersistenceStore<S: KeyValueStore> {
    backend: S,
    key: String,
    export_prefix: String,
}

impl<S: KeyValueStore> PersistenceStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_names(backend, STORAGE_KEY, EXPORT_PREFIX)
    }

    pub fn with_names(backend: S, key: impl Into<String>, export_prefix: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            export_prefix: export_prefix.into(),
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Stamp `_savedAt` and overwrite the stored document
    pub fn commit(&mut self, snapshot: &FieldSnapshot, now: Millis) -> Result<PersistedDocument, PersistenceError> {
        let mut snapshot = snapshot.clone();
        snapshot.set_saved_at(time::iso_timestamp(now));

        let json = serde_json::to_string(&snapshot)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.backend.set_item(&self.key, &json)?;

        log::info!("Report saved ({} fields)", snapshot.len());
        Ok(PersistedDocument { snapshot })
    }

    /// Read the stored document; `None` when nothing is stored
    pub fn load(&self) -> Result<Option<PersistedDocument>, PersistenceError> {
        let Some(json) = self.backend.get_item(&self.key)? else {
            return Ok(None);
        };
        let snapshot: FieldSnapshot = serde_json::from_str(&json)
            .map_err(|e| PersistenceError::Deserialization(e.to_string()))?;
        Ok(Some(PersistedDocument { snapshot }))
    }

    /// Remove the stored document
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.backend.remove_item(&self.key)?;
        log::info!("Saved report cleared");
        Ok(())
    }

    /// Pretty JSON of `snapshot`, named `<prefix>-<millis>.json`
    pub fn export_file(&self, snapshot: &FieldSnapshot, now: Millis) -> Result<ExportFile, PersistenceError> {
        let contents = serde_json::to_string_pretty(snapshot)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        Ok(ExportFile {
            file_name: format!("{}-{}.json", self.export_prefix, now),
            contents,
        })
    }

    /// Parse an uploaded report and, if valid, make it the stored document.
    /// On a parse failure the stored document is left as it was.
    pub fn import_file(&mut self, contents: &str) -> Result<PersistedDocument, PersistenceError> {
        let snapshot: FieldSnapshot =
            serde_json::from_str(contents).map_err(|e| PersistenceError::Parse(e.to_string()))?;

        let json = serde_json::to_string(&snapshot)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.backend.set_item(&self.key, &json)?;

        log::info!("Report imported ({} fields)", snapshot.len());
        Ok(PersistedDocument { snapshot })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::storage::{MemoryStore, StorageError};
    use proptest::prelude::*;

    const NOW: Millis = 1_714_557_600_000;

    fn scenario_snapshot() -> FieldSnapshot {
        [("vehicle-marque", "Renault"), ("vehicle-immat", "AB-123-CD")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_commit_then_load_scenario() {
        let mut store = PersistenceStore::new(MemoryStore::new());
        store.commit(&scenario_snapshot(), NOW).unwrap();

        let doc = store.load().unwrap().unwrap();
        assert_eq!(doc.snapshot().get("vehicle-marque"), Some("Renault"));
        assert_eq!(doc.snapshot().get("vehicle-immat"), Some("AB-123-CD"));
        assert_eq!(doc.saved_at(), Some("2024-05-01T10:00:00.000Z"));
    }

    #[test]
    fn test_stored_under_fixed_key() {
        let mut store = PersistenceStore::new(MemoryStore::new());
        store.commit(&scenario_snapshot(), NOW).unwrap();
        let raw = store.backend().get_item("foxcars_inspection_report").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["_savedAt"], "2024-05-01T10:00:00.000Z");
    }

    #[test]
    fn test_load_absent() {
        let store = PersistenceStore::new(MemoryStore::new());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_load_corrupt_is_deserialization_error() {
        let mut backend = MemoryStore::new();
        backend.set_item(STORAGE_KEY, "{not json").unwrap();
        let store = PersistenceStore::new(backend);
        assert!(matches!(store.load(), Err(PersistenceError::Deserialization(_))));
    }

    #[test]
    fn test_clear_removes_document() {
        let mut store = PersistenceStore::new(MemoryStore::new());
        store.commit(&scenario_snapshot(), NOW).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_malformed_import_keeps_store() {
        let mut store = PersistenceStore::new(MemoryStore::new());
        store.commit(&scenario_snapshot(), NOW).unwrap();
        let before = store.load().unwrap();

        let err = store.import_file("{\"vehicle-marque\": ").unwrap_err();
        assert!(matches!(err, PersistenceError::Parse(_)));
        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn test_import_replaces_verbatim() {
        let mut store = PersistenceStore::new(MemoryStore::new());
        store.commit(&scenario_snapshot(), NOW).unwrap();

        let doc = store
            .import_file(r#"{"vehicle-modele": "Clio", "_savedAt": "2023-01-02T03:04:05.000Z"}"#)
            .unwrap();
        assert_eq!(doc.saved_at(), Some("2023-01-02T03:04:05.000Z"));

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.snapshot().get("vehicle-modele"), Some("Clio"));
        // Not merged with the previous document
        assert_eq!(loaded.snapshot().get("vehicle-marque"), None);
    }

    #[test]
    fn test_export_file_name_and_format() {
        let store = PersistenceStore::new(MemoryStore::new());
        let file = store.export_file(&scenario_snapshot(), NOW).unwrap();
        assert_eq!(file.file_name, "foxcars-inspection-1714557600000.json");
        assert!(file.contents.contains("\n  \"vehicle-immat\": \"AB-123-CD\""));
    }

    #[test]
    fn test_quota_error_propagates() {
        let mut store = PersistenceStore::new(MemoryStore::with_quota(16));
        let err = store.commit(&scenario_snapshot(), NOW).unwrap_err();
        assert!(matches!(err, PersistenceError::Storage(StorageError::QuotaExceeded)));
    }

    proptest! {
        #[test]
        fn test_commit_load_round_trip(
            fields in proptest::collection::btree_map("[a-z][a-z0-9-]{0,10}", ".{0,20}", 0..10)
        ) {
            let snapshot: FieldSnapshot = fields.into_iter().collect();
            let mut store = PersistenceStore::new(MemoryStore::new());
            store.commit(&snapshot, NOW).unwrap();
            let loaded = store.load().unwrap().unwrap();
            prop_assert!(loaded.snapshot().same_fields(&snapshot));
        }
    }
}
