//! Durable client state: the key-value store abstraction and the two
//! features built on it, the saved set and recent searches.

mod kv;
mod recent;
mod saved;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use recent::{RecentSearch, RecentSearches, RECENT_SEARCHES_KEY};
pub use saved::{SavedSet, SAVED_IDS_KEY, SAVED_RECORDS_KEY};

/// Read and deserialize a JSON value; missing or unreadable data is `None`
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            tracing::warn!(key, "Failed to read store: {}", e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, "Ignoring malformed stored value: {}", e);
            None
        }
    }
}

pub(crate) fn write_json<T: serde::Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> crate::Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
