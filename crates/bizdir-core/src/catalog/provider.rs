use std::path::{Path, PathBuf};

use super::models::Record;
use crate::{Error, Result};

/// Source of the catalog, read once at controller initialization
pub trait CatalogProvider {
    fn load(&self) -> Result<Vec<Record>>;
}

/// Catalog stored as a JSON array of records
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for JsonCatalog {
    fn load(&self) -> Result<Vec<Record>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::CatalogLoad(format!("{}: {}", self.path.display(), e))
        })?;
        let records: Vec<Record> = serde_json::from_str(&content)?;
        tracing::info!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

/// In-memory catalog, used by tests and embedders
pub struct StaticCatalog {
    records: Vec<Record>,
}

impl StaticCatalog {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl CatalogProvider for StaticCatalog {
    fn load(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}
