use std::sync::Arc;

use crate::catalog::Record;

/// Result of an advance request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A page was appended to the window
    Appended { added: usize, from_preload: bool },
    /// The next slice was empty; the window is now fully loaded
    Exhausted,
    /// No-op: the window was already fully loaded
    Complete,
    /// No-op: another advance is pending
    Busy,
    /// No-op: the pending advance was cancelled by a reset
    Cancelled,
}

/// Owns the page cursor and the materialized display window.
///
/// The window is always the prefix of the current filtered list of length
/// `min((cursor + 1) * page_size, filtered.len())`.
#[derive(Debug, Clone)]
pub struct WindowingController {
    page_size: usize,
    cursor: usize,
    window: Vec<Arc<Record>>,
    has_more: bool,
    pending: bool,
}

impl WindowingController {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            cursor: 0,
            window: Vec::new(),
            has_more: false,
            pending: false,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn window(&self) -> &[Arc<Record>] {
        &self.window
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Show the first page of a new filtered list. Cancels any pending advance.
    pub fn reset(&mut self, filtered: &[Arc<Record>]) {
        let end = self.page_size.min(filtered.len());
        self.cursor = 0;
        self.window = filtered[..end].to_vec();
        self.has_more = filtered.len() > self.page_size;
        self.pending = false;
    }

    /// Append the next page synchronously
    pub fn advance(
        &mut self,
        filtered: &[Arc<Record>],
        preloaded: Option<Vec<Arc<Record>>>,
    ) -> AdvanceOutcome {
        if self.pending {
            return AdvanceOutcome::Busy;
        }
        if !self.has_more {
            return AdvanceOutcome::Complete;
        }
        self.pending = true;
        let outcome = self.append_next_page(filtered, preloaded);
        self.pending = false;
        outcome
    }

    /// Latch an advance that will be applied later by [`finish_advance`].
    /// Returns false when one is already pending or nothing is left to load.
    ///
    /// [`finish_advance`]: Self::finish_advance
    pub fn begin_advance(&mut self) -> bool {
        if self.pending || !self.has_more {
            return false;
        }
        self.pending = true;
        true
    }

    /// Apply a latched advance and release the latch
    pub fn finish_advance(
        &mut self,
        filtered: &[Arc<Record>],
        preloaded: Option<Vec<Arc<Record>>>,
    ) -> AdvanceOutcome {
        if !self.pending {
            return AdvanceOutcome::Cancelled;
        }
        let outcome = self.append_next_page(filtered, preloaded);
        self.pending = false;
        outcome
    }

    /// Range of the page that the next advance would append
    pub fn next_page_range(&self, total: usize) -> std::ops::Range<usize> {
        let start = ((self.cursor + 1) * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        start..end
    }

    fn append_next_page(
        &mut self,
        filtered: &[Arc<Record>],
        preloaded: Option<Vec<Arc<Record>>>,
    ) -> AdvanceOutcome {
        self.rederive(filtered);

        let range = self.next_page_range(filtered.len());
        let (next, from_preload) = match preloaded {
            Some(page) if !page.is_empty() && lines_up(filtered, range.clone(), &page) => {
                (page, true)
            }
            _ => (filtered[range].to_vec(), false),
        };

        if next.is_empty() {
            self.has_more = false;
            return AdvanceOutcome::Exhausted;
        }

        let added = next.len();
        self.window.extend(next);
        self.cursor += 1;
        self.has_more = self.window.len() < filtered.len();

        tracing::debug!(
            cursor = self.cursor,
            displayed = self.window.len(),
            total = filtered.len(),
            from_preload,
            "Advanced display window"
        );

        AdvanceOutcome::Appended { added, from_preload }
    }

    /// Rebuild the window from the current list if it is no longer a prefix
    /// of it, then recompute `has_more` from the actual lengths.
    fn rederive(&mut self, filtered: &[Arc<Record>]) {
        let expected = ((self.cursor + 1) * self.page_size).min(filtered.len());
        let is_prefix = self.window.len() == expected
            && self
                .window
                .iter()
                .zip(filtered)
                .all(|(a, b)| Arc::ptr_eq(a, b));

        if !is_prefix {
            tracing::debug!(
                displayed = self.window.len(),
                expected,
                "Display window out of sync with filtered list, re-deriving"
            );
            self.window = filtered[..expected].to_vec();
        }
        self.has_more = self.window.len() < filtered.len();
    }
}

fn lines_up(filtered: &[Arc<Record>], range: std::ops::Range<usize>, page: &[Arc<Record>]) -> bool {
    page.len() == range.len()
        && filtered[range]
            .iter()
            .zip(page)
            .all(|(a, b)| Arc::ptr_eq(a, b))
}
