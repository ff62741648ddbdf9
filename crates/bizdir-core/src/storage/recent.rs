use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{read_json, write_json, KeyValueStore};

pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

const MIN_TERM_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub id: Uuid,
    pub term: String,
    pub timestamp: DateTime<Utc>,
}

/// Most-recent-first list of submitted search terms
pub struct RecentSearches {
    store: Arc<dyn KeyValueStore>,
    limit: usize,
    entries: Vec<RecentSearch>,
}

impl RecentSearches {
    pub fn load(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        let mut entries: Vec<RecentSearch> =
            read_json(store.as_ref(), RECENT_SEARCHES_KEY).unwrap_or_default();
        entries.truncate(limit);
        Self {
            store,
            limit,
            entries,
        }
    }

    pub fn entries(&self) -> &[RecentSearch] {
        &self.entries
    }

    /// Record a submitted term. Terms shorter than two characters are
    /// ignored; an existing entry with the same term moves to the front.
    pub fn record(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.chars().count() < MIN_TERM_LEN {
            return false;
        }

        let lowered = term.to_lowercase();
        self.entries.retain(|s| s.term.to_lowercase() != lowered);
        self.entries.insert(
            0,
            RecentSearch {
                id: Uuid::new_v4(),
                term: term.to_string(),
                timestamp: Utc::now(),
            },
        );
        self.entries.truncate(self.limit);
        self.persist();
        true
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    fn persist(&self) {
        if let Err(e) = write_json(self.store.as_ref(), RECENT_SEARCHES_KEY, &self.entries) {
            tracing::warn!("Failed to persist recent searches: {}", e);
        }
    }
}

impl std::fmt::Debug for RecentSearches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentSearches")
            .field("limit", &self.limit)
            .field("entries", &self.entries)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn recent() -> (RecentSearches, Arc<dyn KeyValueStore>) {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        (RecentSearches::load(store.clone(), 5), store)
    }

    fn terms(recent: &RecentSearches) -> Vec<&str> {
        recent.entries().iter().map(|s| s.term.as_str()).collect()
    }

    #[test]
    fn test_short_terms_are_skipped() {
        let (mut recent, _) = recent();
        assert!(!recent.record(""));
        assert!(!recent.record("  a  "));
        assert!(recent.record(" tacos "));
        assert_eq!(terms(&recent), vec!["tacos"]);
    }

    #[test]
    fn test_newest_first_with_case_insensitive_dedupe() {
        let (mut recent, _) = recent();
        recent.record("coffee");
        recent.record("law");
        recent.record("Coffee");
        assert_eq!(terms(&recent), vec!["Coffee", "law"]);
    }

    #[test]
    fn test_limit_and_persistence() {
        let (mut recent, store) = recent();
        for term in ["aa", "bb", "cc", "dd", "ee", "ff"] {
            recent.record(term);
        }
        assert_eq!(terms(&recent), vec!["ff", "ee", "dd", "cc", "bb"]);

        let reloaded = RecentSearches::load(store, 5);
        assert_eq!(terms(&reloaded), vec!["ff", "ee", "dd", "cc", "bb"]);
    }

    #[test]
    fn test_remove_by_id() {
        let (mut recent, _) = recent();
        recent.record("plumbing");
        recent.record("bakery");
        let id = recent.entries()[1].id;

        assert!(recent.remove(id));
        assert!(!recent.remove(id));
        assert_eq!(terms(&recent), vec!["bakery"]);
    }
}
