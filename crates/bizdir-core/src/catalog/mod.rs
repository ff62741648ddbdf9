mod models;
mod provider;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub use models::{Record, SocialLinks};
pub use provider::{CatalogProvider, JsonCatalog, StaticCatalog};

/// Ordered, immutable list of records for one session
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Arc<[Arc<Record>]>,
}

impl Catalog {
    pub fn new(records: Vec<Record>) -> Self {
        warn_duplicate_keys(&records);
        Self {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Load through a provider; a failure yields an empty catalog plus the error
    pub fn load(provider: &dyn CatalogProvider) -> (Self, Option<crate::Error>) {
        match provider.load() {
            Ok(records) => (Self::new(records), None),
            Err(e) => {
                tracing::error!("Catalog load failed: {}", e);
                (Self::empty(), Some(e))
            }
        }
    }

    pub fn records(&self) -> &[Arc<Record>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, key: &str) -> Option<&Arc<Record>> {
        self.records.iter().find(|r| r.key() == key)
    }

    /// Sorted unique categories present in the catalog
    pub fn categories(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Record shown in the spotlight: first featured entry, else first board member
    pub fn spotlight(&self) -> Option<&Arc<Record>> {
        self.records
            .iter()
            .find(|r| r.is_featured())
            .or_else(|| self.records.iter().find(|r| r.is_board_member))
    }
}

fn warn_duplicate_keys(records: &[Record]) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *seen.entry(record.key()).or_default() += 1;
    }
    for (key, count) in seen.into_iter().filter(|(_, c)| *c > 1) {
        tracing::warn!(
            key,
            count,
            "Duplicate record key; saved state for these records is shared"
        );
    }
}
