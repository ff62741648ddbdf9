pub mod categories;
pub mod list;
pub mod run;
pub mod saved;

use std::path::Path;
use std::sync::Arc;

use bizdir_core::storage::{FileStore, KeyValueStore, MemoryStore};

/// Open a file-backed store, falling back to memory so the browser still
/// starts when the data directory is unusable
pub fn open_store(path: &Path) -> Arc<dyn KeyValueStore> {
    match FileStore::open(path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("Cannot open store {}: {}, using memory", path.display(), e);
            Arc::new(MemoryStore::new())
        }
    }
}
