use std::collections::BTreeSet;
use std::sync::Arc;

use super::{read_json, write_json, KeyValueStore};
use crate::catalog::Record;

pub const SAVED_IDS_KEY: &str = "savedBusinessIds";
pub const SAVED_RECORDS_KEY: &str = "savedBusinesses";

/// Records the user has bookmarked, keyed by [`Record::key`].
///
/// The id set answers membership; the record snapshots back the saved view
/// without needing the catalog. Both are written through on every toggle.
pub struct SavedSet {
    store: Arc<dyn KeyValueStore>,
    ids: BTreeSet<String>,
}

impl SavedSet {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let ids: Vec<String> = read_json(store.as_ref(), SAVED_IDS_KEY).unwrap_or_default();
        Self {
            store,
            ids: ids.into_iter().collect(),
        }
    }

    pub fn has(&self, record: &Record) -> bool {
        self.ids.contains(record.key())
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Flip the saved state of `record` and return the new state
    pub fn toggle(&mut self, record: &Record) -> bool {
        let key = record.key().to_string();
        let mut snapshots = self.saved_records();

        let saved = if self.ids.remove(&key) {
            snapshots.retain(|r| r.key() != key);
            false
        } else {
            if !snapshots.iter().any(|r| r.key() == key) {
                snapshots.push(record.clone());
            }
            self.ids.insert(key.clone());
            true
        };

        let ids: Vec<&String> = self.ids.iter().collect();
        if let Err(e) = write_json(self.store.as_ref(), SAVED_IDS_KEY, &ids)
            .and_then(|_| write_json(self.store.as_ref(), SAVED_RECORDS_KEY, &snapshots))
        {
            tracing::warn!(key = %key, "Failed to persist saved records: {}", e);
        }

        tracing::debug!(key = %key, saved, count = self.ids.len(), "Toggled saved record");
        saved
    }

    /// Snapshots of every saved record, in the order they were saved
    pub fn saved_records(&self) -> Vec<Record> {
        read_json(self.store.as_ref(), SAVED_RECORDS_KEY).unwrap_or_default()
    }
}

impl std::fmt::Debug for SavedSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavedSet").field("ids", &self.ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_toggle_round_trip() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut saved = SavedSet::load(store.clone());
        let cafe = Record::new("Corner Cafe", "Food & Dining");

        assert!(!saved.has(&cafe));
        assert!(saved.toggle(&cafe));
        assert!(saved.has(&cafe));
        assert_eq!(saved.count(), 1);
        assert_eq!(saved.saved_records()[0].name, "Corner Cafe");

        assert!(!saved.toggle(&cafe));
        assert_eq!(saved.count(), 0);
        assert!(saved.saved_records().is_empty());
    }

    #[test]
    fn test_survives_reload() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut first = Record::new("Tacoma Print", "Retail");
        first.id = Some("biz-7".to_string());
        {
            let mut saved = SavedSet::load(store.clone());
            saved.toggle(&first);
            saved.toggle(&Record::new("Harbor Law", "Professional Services"));
        }

        let saved = SavedSet::load(store);
        assert_eq!(saved.count(), 2);
        assert!(saved.has(&first));
        let names: Vec<String> = saved.saved_records().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Tacoma Print", "Harbor Law"]);
    }

    #[test]
    fn test_malformed_ids_load_empty() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(SAVED_IDS_KEY, "{not a list").unwrap();
        assert_eq!(SavedSet::load(store).count(), 0);
    }
}
