//! Filter engine: catalog + criteria -> ordered filtered list.
//!
//! A linear scan over the catalog on every call.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::catalog::{Catalog, Record};

/// Filtered view of the catalog, always in catalog order
pub type FilteredList = Arc<[Arc<Record>]>;

pub const BOARD_MEMBER: &str = "Board Member";
pub const BMC_MEMBER: &str = "BMC Member";

/// Certification labels offered to the user. Only the first two map to a
/// record attribute; the rest currently match nothing.
pub const CERTIFICATION_OPTIONS: [&str; 4] =
    [BOARD_MEMBER, BMC_MEMBER, "Woman-Owned", "Minority-Owned"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search_term: String,
    pub categories: BTreeSet<String>,
    pub certifications: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.categories.is_empty() && self.certifications.is_empty()
    }

    /// Number of selected categories and certifications
    pub fn active_filter_count(&self) -> usize {
        self.categories.len() + self.certifications.len()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matches_search(record) && self.matches_category(record) && self.matches_certification(record)
    }

    fn matches_search(&self, record: &Record) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let term = self.search_term.to_lowercase();
        record.name.to_lowercase().contains(&term)
            || record.description.to_lowercase().contains(&term)
            || record
                .owner
                .as_ref()
                .map(|o| o.to_lowercase().contains(&term))
                .unwrap_or(false)
    }

    fn matches_category(&self, record: &Record) -> bool {
        self.categories.is_empty() || self.categories.contains(&record.category)
    }

    fn matches_certification(&self, record: &Record) -> bool {
        self.certifications.is_empty()
            || self
                .certifications
                .iter()
                .any(|cert| certification_holds(cert, record))
    }
}

/// Fixed label -> attribute lookup
fn certification_holds(label: &str, record: &Record) -> bool {
    match label {
        BOARD_MEMBER => record.is_board_member,
        BMC_MEMBER => record.is_member,
        _ => false,
    }
}

pub fn filter(catalog: &Catalog, criteria: &FilterCriteria) -> FilteredList {
    if criteria.is_empty() {
        return catalog.records().iter().cloned().collect();
    }
    catalog
        .records()
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}
