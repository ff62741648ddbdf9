use std::sync::Arc;

use super::FilterVersion;
use crate::catalog::Record;
use crate::filter::FilteredList;

/// Work item handed to the background queue
#[derive(Debug, Clone)]
pub struct PreloadRequest {
    pub version: FilterVersion,
    pub page: usize,
    page_size: usize,
    filtered: FilteredList,
}

impl PreloadRequest {
    /// Slice the requested page out of the filtered list
    pub fn run(self) -> PreloadedPage {
        let start = (self.page * self.page_size).min(self.filtered.len());
        let end = (start + self.page_size).min(self.filtered.len());
        PreloadedPage {
            version: self.version,
            page: self.page,
            records: self.filtered[start..end].to_vec(),
        }
    }
}

/// One page computed ahead of the scroll trigger
#[derive(Debug, Clone)]
pub struct PreloadedPage {
    pub version: FilterVersion,
    pub page: usize,
    pub records: Vec<Arc<Record>>,
}

/// Speculatively prepares the next page. At most one preload runs at a time
/// and at most one page is cached.
#[derive(Debug, Clone)]
pub struct Preloader {
    page_size: usize,
    in_flight: Option<(FilterVersion, usize)>,
    cache: Option<PreloadedPage>,
}

impl Preloader {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            in_flight: None,
            cache: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn cached_page(&self) -> Option<(FilterVersion, usize)> {
        self.cache.as_ref().map(|p| (p.version, p.page))
    }

    /// Request a preload of `next_page`. Returns the work to run, or `None`
    /// when a preload is already running or the page would be empty.
    pub fn schedule(
        &mut self,
        version: FilterVersion,
        next_page: usize,
        filtered: &FilteredList,
    ) -> Option<PreloadRequest> {
        if let Some((running_version, running_page)) = self.in_flight {
            tracing::debug!(
                next_page,
                %running_version,
                running_page,
                "Preload blocked: already running"
            );
            return None;
        }
        if next_page * self.page_size >= filtered.len() {
            tracing::debug!(
                next_page,
                total = filtered.len(),
                "Preload skipped: nothing left"
            );
            return None;
        }
        if self.cached_page() == Some((version, next_page)) {
            return None;
        }

        self.in_flight = Some((version, next_page));
        tracing::debug!(next_page, %version, "Preloading page");
        Some(PreloadRequest {
            version,
            page: next_page,
            page_size: self.page_size,
            filtered: filtered.clone(),
        })
    }

    /// Settle a finished preload. Always clears the running flag; the page is
    /// kept only if it was computed under the current filter version.
    pub fn complete(&mut self, current: FilterVersion, page: PreloadedPage) -> bool {
        self.in_flight = None;
        if page.version != current {
            tracing::debug!(
                stale = %page.version,
                %current,
                "Dropping preload computed for stale filters"
            );
            return false;
        }
        if page.records.is_empty() {
            return false;
        }
        tracing::debug!(page = page.page, records = page.records.len(), "Preloaded page");
        self.cache = Some(page);
        true
    }

    /// Consume the cached page if it matches; the cache is cleared either way
    pub fn take(&mut self, version: FilterVersion, page: usize) -> Option<Vec<Arc<Record>>> {
        match self.cache.take() {
            Some(cached) if cached.version == version && cached.page == page => {
                Some(cached.records)
            }
            _ => None,
        }
    }

    /// Drop the cached page. Running work finishes but its output is
    /// discarded by the version check in [`complete`](Self::complete).
    pub fn invalidate(&mut self) {
        self.cache = None;
    }
}
