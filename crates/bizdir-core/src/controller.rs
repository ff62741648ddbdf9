//! Page-level directory controller.
//!
//! Owns the filter criteria, the windowing controller, the preloader, the
//! scroll trigger and both scroll mementos, and drives them from a single
//! event loop. Timers and background work run as tokio tasks that post a
//! [`DirectoryEvent`] back to the controller; the host drains events with
//! [`DirectoryController::next_event`] or [`DirectoryController::try_next_event`]
//! and feeds them to [`DirectoryController::handle`].
//!
//! Every event carries the filter version, sequence number or restoration
//! session it was scheduled under, so work scheduled before a reset or a
//! newer input is discarded when it arrives.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::catalog::{Catalog, Record};
use crate::config::AppConfig;
use crate::filter::{filter, FilterCriteria, FilteredList};
use crate::paging::{
    AdvanceOutcome, FilterVersion, PreloadRequest, PreloadedPage, Preloader, WindowingController,
};
use crate::scroll::{
    Evaluation, NavigationMemento, PollOutcome, ReloadMemento, ScrollMetrics, ScrollTrigger,
    TriggerGates,
};
use crate::storage::{KeyValueStore, RecentSearch, RecentSearches, SavedSet};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
}

/// Deferred work delivered back to the controller
#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    /// Search debounce elapsed
    SearchCommit { seq: u64 },
    /// Scroll debounce elapsed
    ScrollSettled { seq: u64 },
    /// Apply a latched advance
    AdvanceCommit { version: FilterVersion },
    /// Start preloading `page`
    PreloadKick { version: FilterVersion, page: usize },
    /// Background preload finished
    PreloadReady(PreloadedPage),
    RestorePoll { session: u64 },
    RestoreTimeout { session: u64 },
    RestoreSettled { session: u64 },
    /// Settle delay after returning from a detail view elapsed
    ReturnSettled { seq: u64 },
}

/// Counts shown in the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListSummary {
    pub total: usize,
    pub shown: usize,
    pub has_more: bool,
    pub loading_more: bool,
    pub preloading: bool,
}

#[derive(Debug, Clone, Copy)]
struct Timings {
    initial_preload: Duration,
    next_preload: Duration,
    search_debounce: Duration,
    restore_poll: Duration,
    restore_timeout: Duration,
    restore_settle: Duration,
    return_settle: Duration,
}

impl Timings {
    fn from_config(config: &AppConfig) -> Self {
        Self {
            initial_preload: config.paging.initial_preload_delay(),
            next_preload: config.paging.next_preload_delay(),
            search_debounce: config.search.debounce(),
            restore_poll: config.scroll.restore_poll(),
            restore_timeout: config.scroll.restore_timeout(),
            restore_settle: config.scroll.restore_settle(),
            return_settle: config.scroll.return_settle(),
        }
    }
}

/// Posts events onto the controller's queues. Timers and immediate events go
/// to the foreground queue; preload work goes to the background queue, which
/// is only drained while the foreground queue is empty.
#[derive(Debug, Clone)]
struct Scheduler {
    fg_tx: mpsc::UnboundedSender<DirectoryEvent>,
    bg_tx: mpsc::UnboundedSender<DirectoryEvent>,
}

impl Scheduler {
    fn now(&self, event: DirectoryEvent) {
        let _ = self.fg_tx.send(event);
    }

    fn after(&self, delay: Duration, event: DirectoryEvent) {
        let tx = self.fg_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        });
    }

    fn idle(&self, request: PreloadRequest) {
        let tx = self.bg_tx.clone();
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            let page = request.run();
            let _ = tx.send(DirectoryEvent::PreloadReady(page));
        });
    }
}

pub struct DirectoryController {
    catalog: Catalog,
    criteria: FilterCriteria,
    filtered: FilteredList,
    version: FilterVersion,
    window: WindowingController,
    preloader: Preloader,
    trigger: ScrollTrigger,
    navigation: NavigationMemento,
    reload: ReloadMemento,
    saved: SavedSet,
    recent: RecentSearches,
    timings: Timings,

    view: View,
    detail: Option<Arc<Record>>,
    metrics: ScrollMetrics,
    pending_jump: Option<u32>,

    search_input: String,
    search_seq: u64,
    return_seq: u64,
    returning: bool,

    scheduler: Scheduler,
    fg_rx: mpsc::UnboundedReceiver<DirectoryEvent>,
    bg_rx: mpsc::UnboundedReceiver<DirectoryEvent>,
}

impl DirectoryController {
    /// Build a controller over `catalog`. Saved records and recent searches
    /// live in `local`; the reload scroll offset lives in `session`.
    pub fn new(
        config: &AppConfig,
        catalog: Catalog,
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (fg_tx, fg_rx) = mpsc::unbounded_channel();
        let (bg_tx, bg_rx) = mpsc::unbounded_channel();
        let criteria = FilterCriteria::default();
        let filtered = filter(&catalog, &criteria);

        Self {
            catalog,
            criteria,
            filtered,
            version: FilterVersion::default(),
            window: WindowingController::new(config.paging.page_size),
            preloader: Preloader::new(config.paging.page_size),
            trigger: ScrollTrigger::new(config.scroll.threshold, config.scroll.debounce()),
            navigation: NavigationMemento::default(),
            reload: ReloadMemento::new(session),
            saved: SavedSet::load(local.clone()),
            recent: RecentSearches::load(local, config.search.recent_limit),
            timings: Timings::from_config(config),
            view: View::List,
            detail: None,
            metrics: ScrollMetrics::default(),
            pending_jump: None,
            search_input: String::new(),
            search_seq: 0,
            return_seq: 0,
            returning: false,
            scheduler: Scheduler { fg_tx, bg_tx },
            fg_rx,
            bg_rx,
        }
    }

    /// Show the first page and start restoring the offset saved by the
    /// previous session, if any. Must run inside a tokio runtime.
    pub fn mount(&mut self) {
        tracing::info!(
            records = self.catalog.len(),
            categories = self.catalog.categories().len(),
            "Mounting directory"
        );
        self.reset_window();

        if let Some((session, target)) = self.reload.begin() {
            tracing::info!(offset = target, "Restoring scroll offset from previous session");
            self.trigger.set_enabled(false);
            if let Some(shown) = self.reload.shown() {
                self.regrow_window(shown);
            }
            self.scheduler
                .after(self.timings.restore_poll, DirectoryEvent::RestorePoll { session });
            self.scheduler
                .after(self.timings.restore_timeout, DirectoryEvent::RestoreTimeout { session });
        }
    }

    /// Replace the search term immediately, cancelling any typed text still
    /// waiting for its debounce
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        self.search_seq += 1;
        self.search_input = term.clone();
        if self.criteria.search_term != term {
            self.criteria.search_term = term;
            self.apply_criteria();
        }
    }

    /// Update the search box; the term is applied after the debounce period
    pub fn type_search(&mut self, text: impl Into<String>) {
        self.search_input = text.into();
        self.search_seq += 1;
        self.scheduler.after(
            self.timings.search_debounce,
            DirectoryEvent::SearchCommit { seq: self.search_seq },
        );
    }

    /// Apply the search box now and remember the term
    pub fn submit_search(&mut self) {
        let term = self.search_input.clone();
        self.set_search_term(term.clone());
        self.recent.record(&term);
    }

    pub fn toggle_category(&mut self, category: &str) {
        if !self.criteria.categories.remove(category) {
            self.criteria.categories.insert(category.to_string());
        }
        self.apply_criteria();
    }

    pub fn toggle_certification(&mut self, label: &str) {
        if !self.criteria.certifications.remove(label) {
            self.criteria.certifications.insert(label.to_string());
        }
        self.apply_criteria();
    }

    pub fn clear_filters(&mut self) {
        self.search_seq += 1;
        self.search_input.clear();
        if self.criteria.is_empty() {
            return;
        }
        self.criteria = FilterCriteria::default();
        self.apply_criteria();
    }

    /// User scrolled the list
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        self.metrics = metrics;
        if self.view != View::List {
            return;
        }
        match self.trigger.on_scroll(metrics) {
            Some(seq) => self
                .scheduler
                .after(self.trigger.debounce(), DirectoryEvent::ScrollSettled { seq }),
            None => self.trigger.observe(metrics),
        }
    }

    /// Layout changed without user scrolling (resize, content growth, jump)
    pub fn report_layout(&mut self, metrics: ScrollMetrics) {
        self.metrics = metrics;
        self.trigger.observe(metrics);
    }

    /// Open the detail view for the record with `key`, remembering the list
    /// offset
    pub fn open_detail(&mut self, key: &str) -> Result<()> {
        let record = self
            .window
            .window()
            .iter()
            .chain(self.catalog.records())
            .find(|r| r.key() == key)
            .cloned()
            .ok_or_else(|| Error::RecordNotFound(key.to_string()))?;

        self.reload.cancel();
        self.returning = false;
        self.navigation.capture(self.metrics.scroll_top);
        self.trigger.set_enabled(false);
        self.view = View::Detail;
        tracing::debug!(key, offset = self.metrics.scroll_top, "Opened detail view");
        self.detail = Some(record);
        Ok(())
    }

    /// Return to the list. The saved offset is applied after the next frame
    /// renders; the display window is left as it was.
    pub fn close_detail(&mut self) {
        if self.view != View::Detail {
            return;
        }
        self.view = View::List;
        self.detail = None;
        self.return_seq += 1;

        if !self.navigation.begin_return() {
            self.trigger.set_enabled(true);
        }
    }

    /// Host finished painting a frame
    pub fn on_frame_rendered(&mut self) {
        if self.view != View::List {
            return;
        }
        if let Some(offset) = self.navigation.on_paint() {
            tracing::debug!(offset, "Restoring list offset after detail view");
            self.pending_jump = Some(offset);
            self.returning = true;
            self.scheduler.after(
                self.timings.return_settle,
                DirectoryEvent::ReturnSettled { seq: self.return_seq },
            );
        }
    }

    /// Offset the host should jump to instantly, if any
    pub fn take_scroll_jump(&mut self) -> Option<u32> {
        let jump = self.pending_jump.take()?;
        self.metrics.scroll_top = jump;
        Some(jump)
    }

    /// Save the list offset so the next session can restore it
    pub fn persist_scroll_offset(&self) {
        let offset = match self.view {
            View::Detail => self.navigation.saved().unwrap_or(self.metrics.scroll_top),
            View::List => self.metrics.scroll_top,
        };
        let shown = self.window.window().len();
        tracing::debug!(offset, shown, "Persisting scroll offset");
        self.reload.persist(offset, shown);
    }

    pub fn is_saved(&self, record: &Record) -> bool {
        self.saved.has(record)
    }

    pub fn toggle_saved(&mut self, key: &str) -> Result<bool> {
        let record = self
            .catalog
            .find(key)
            .cloned()
            .ok_or_else(|| Error::RecordNotFound(key.to_string()))?;
        Ok(self.saved.toggle(&record))
    }

    pub fn saved_count(&self) -> usize {
        self.saved.count()
    }

    pub fn saved_records(&self) -> Vec<Record> {
        self.saved.saved_records()
    }

    pub fn recent_searches(&self) -> &[RecentSearch] {
        self.recent.entries()
    }

    pub fn remove_recent_search(&mut self, id: Uuid) -> bool {
        self.recent.remove(id)
    }

    /// Next ready event without waiting; foreground work comes first
    pub fn try_next_event(&mut self) -> Option<DirectoryEvent> {
        self.fg_rx
            .try_recv()
            .ok()
            .or_else(|| self.bg_rx.try_recv().ok())
    }

    /// Wait for the next event; background work only runs when no
    /// foreground event is ready
    pub async fn next_event(&mut self) -> Option<DirectoryEvent> {
        tokio::select! {
            biased;
            Some(event) = self.fg_rx.recv() => Some(event),
            Some(event) = self.bg_rx.recv() => Some(event),
            else => None,
        }
    }

    /// Handle every event that is already queued. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.try_next_event() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    pub fn handle(&mut self, event: DirectoryEvent) {
        match event {
            DirectoryEvent::SearchCommit { seq } => {
                if seq == self.search_seq && self.criteria.search_term != self.search_input {
                    self.criteria.search_term = self.search_input.clone();
                    self.apply_criteria();
                }
            }
            DirectoryEvent::ScrollSettled { seq } => {
                let evaluation = self.trigger.settle(seq, self.gates());
                self.on_evaluation(evaluation);
            }
            DirectoryEvent::AdvanceCommit { version } => self.commit_advance(version),
            DirectoryEvent::PreloadKick { version, page } => self.kick_preload(version, page),
            DirectoryEvent::PreloadReady(page) => {
                let stale = page.version != self.version;
                self.preloader.complete(self.version, page);
                if stale && self.window.has_more() {
                    // the reset's own kick may have been refused while this ran
                    self.kick_preload(self.version, self.window.cursor() + 1);
                }
                self.retry_trigger();
            }
            DirectoryEvent::RestorePoll { session } => self.poll_restore(session),
            DirectoryEvent::RestoreTimeout { session } => {
                if self.reload.time_out(session) {
                    tracing::info!(
                        content_height = self.metrics.scroll_height,
                        "Gave up restoring scroll offset"
                    );
                    self.trigger.set_enabled(true);
                }
            }
            DirectoryEvent::RestoreSettled { session } => {
                if self.reload.settle(session) && !self.is_restoring() {
                    self.trigger.set_enabled(true);
                }
            }
            DirectoryEvent::ReturnSettled { seq } => {
                if seq == self.return_seq && self.view == View::List && self.returning {
                    self.returning = false;
                    if !self.reload.is_active() {
                        self.trigger.set_enabled(true);
                    }
                }
            }
        }
    }

    pub fn window(&self) -> &[Arc<Record>] {
        self.window.window()
    }

    pub fn filtered(&self) -> &FilteredList {
        &self.filtered
    }

    pub fn version(&self) -> FilterVersion {
        self.version
    }

    pub fn has_more(&self) -> bool {
        self.window.has_more()
    }

    pub fn is_loading_more(&self) -> bool {
        self.window.is_pending()
    }

    pub fn is_preloading(&self) -> bool {
        self.preloader.is_running()
    }

    /// Page currently held in the preload cache
    pub fn preloaded_page(&self) -> Option<usize> {
        self.preloader
            .cached_page()
            .filter(|(version, _)| *version == self.version)
            .map(|(_, page)| page)
    }

    /// True while either memento is restoring an offset
    pub fn is_restoring(&self) -> bool {
        self.reload.is_active() || self.navigation.is_awaiting_paint() || self.returning
    }

    pub fn is_trigger_enabled(&self) -> bool {
        self.trigger.is_enabled()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn categories(&self) -> Vec<String> {
        self.catalog.categories()
    }

    pub fn spotlight(&self) -> Option<&Arc<Record>> {
        self.catalog.spotlight()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn detail(&self) -> Option<&Arc<Record>> {
        self.detail.as_ref()
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn summary(&self) -> ListSummary {
        ListSummary {
            total: self.filtered.len(),
            shown: self.window.window().len(),
            has_more: self.window.has_more(),
            loading_more: self.window.is_pending(),
            preloading: self.preloader.is_running(),
        }
    }

    fn apply_criteria(&mut self) {
        self.filtered = filter(&self.catalog, &self.criteria);
        tracing::debug!(
            search = %self.criteria.search_term,
            categories = self.criteria.categories.len(),
            certifications = self.criteria.certifications.len(),
            matched = self.filtered.len(),
            "Filters changed"
        );
        self.reset_window();
    }

    fn reset_window(&mut self) {
        self.version = self.version.next();
        self.window.reset(&self.filtered);
        self.preloader.invalidate();
        tracing::debug!(
            version = %self.version,
            shown = self.window.window().len(),
            has_more = self.window.has_more(),
            "Reset display window"
        );

        if self.window.has_more() {
            self.scheduler.after(
                self.timings.initial_preload,
                DirectoryEvent::PreloadKick {
                    version: self.version,
                    page: 1,
                },
            );
        }
    }

    fn gates(&self) -> TriggerGates {
        TriggerGates {
            has_more: self.window.has_more(),
            advance_pending: self.window.is_pending(),
            preload_pending: self.preloader.is_running(),
            window_len: self.window.window().len(),
            restoring: self.is_restoring(),
        }
    }

    fn on_evaluation(&mut self, evaluation: Evaluation) {
        if evaluation == Evaluation::Fire && self.window.begin_advance() {
            self.scheduler.now(DirectoryEvent::AdvanceCommit {
                version: self.version,
            });
        }
    }

    fn retry_trigger(&mut self) {
        let evaluation = self.trigger.retry_deferred(self.gates());
        self.on_evaluation(evaluation);
    }

    fn commit_advance(&mut self, version: FilterVersion) {
        if version != self.version {
            tracing::debug!(stale = %version, current = %self.version, "Dropping advance for stale filters");
            return;
        }
        let next_page = self.window.cursor() + 1;
        let preloaded = self.preloader.take(version, next_page);
        let outcome = self.window.finish_advance(&self.filtered, preloaded);

        if let AdvanceOutcome::Appended { .. } = outcome {
            if self.window.has_more() {
                self.scheduler.after(
                    self.timings.next_preload,
                    DirectoryEvent::PreloadKick {
                        version,
                        page: self.window.cursor() + 1,
                    },
                );
            }
        }
        self.retry_trigger();
    }

    fn kick_preload(&mut self, version: FilterVersion, page: usize) {
        if version != self.version || page <= self.window.cursor() {
            return;
        }
        if let Some(request) = self.preloader.schedule(version, page, &self.filtered) {
            self.scheduler.idle(request);
        }
    }

    /// Append pages until `shown` records are displayed, so the restored
    /// offset has content to land on. The trigger is off while restoring.
    fn regrow_window(&mut self, shown: usize) {
        while self.window.window().len() < shown {
            let next_page = self.window.cursor() + 1;
            let preloaded = self.preloader.take(self.version, next_page);
            match self.window.advance(&self.filtered, preloaded) {
                AdvanceOutcome::Appended { .. } => {}
                _ => break,
            }
        }
        tracing::debug!(
            shown = self.window.window().len(),
            cursor = self.window.cursor(),
            "Regrew display window for restoration"
        );

        if self.window.cursor() > 0 && self.window.has_more() {
            self.scheduler.after(
                self.timings.initial_preload,
                DirectoryEvent::PreloadKick {
                    version: self.version,
                    page: self.window.cursor() + 1,
                },
            );
        }
    }

    fn poll_restore(&mut self, session: u64) {
        let outcome = self.reload.poll(
            session,
            self.metrics.scroll_height,
            self.metrics.viewport_height,
        );
        match outcome {
            PollOutcome::Ready(target) => {
                tracing::debug!(target, "Content tall enough, jumping to saved offset");
                self.pending_jump = Some(target);
                self.scheduler
                    .after(self.timings.restore_settle, DirectoryEvent::RestoreSettled { session });
            }
            PollOutcome::Wait => {
                self.scheduler
                    .after(self.timings.restore_poll, DirectoryEvent::RestorePoll { session });
            }
            PollOutcome::Stale => {}
        }
    }
}

impl std::fmt::Debug for DirectoryController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryController")
            .field("version", &self.version)
            .field("criteria", &self.criteria)
            .field("filtered", &self.filtered.len())
            .field("window", &self.window.window().len())
            .field("view", &self.view)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::{SCROLL_SHOWN_KEY, SCROLL_STORAGE_KEY};
    use crate::storage::MemoryStore;
    use tokio::time::Instant;

    struct Harness {
        ctrl: DirectoryController,
        session: Arc<dyn KeyValueStore>,
    }

    fn catalog(n: usize) -> Catalog {
        let records = (0..n)
            .map(|i| {
                let category = if i % 3 == 0 { "Food & Dining" } else { "Retail" };
                let mut record = Record::new(format!("Business {i:03}"), category);
                record.id = Some(format!("biz-{i}"));
                record.is_member = i % 2 == 0;
                record
            })
            .collect();
        Catalog::new(records)
    }

    fn config(page_size: usize) -> AppConfig {
        let mut config = AppConfig::default();
        config.paging.page_size = page_size;
        config
    }

    fn harness(page_size: usize, records: usize, saved_offset: Option<&str>) -> Harness {
        let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        if let Some(offset) = saved_offset {
            session.set(SCROLL_STORAGE_KEY, offset).unwrap();
        }
        let ctrl = DirectoryController::new(
            &config(page_size),
            catalog(records),
            Arc::new(MemoryStore::new()),
            session.clone(),
        );
        Harness { ctrl, session }
    }

    /// Wait for the next event, handle it and return a copy
    async fn step(ctrl: &mut DirectoryController) -> DirectoryEvent {
        let event = tokio::time::timeout(Duration::from_secs(60), ctrl.next_event())
            .await
            .expect("no event within a minute")
            .expect("queues closed");
        ctrl.handle(event.clone());
        event
    }

    async fn step_until(
        ctrl: &mut DirectoryController,
        mut done: impl FnMut(&DirectoryEvent) -> bool,
    ) -> DirectoryEvent {
        for _ in 0..1000 {
            let event = step(ctrl).await;
            if done(&event) {
                return event;
            }
        }
        panic!("condition never reached");
    }

    async fn settle_preload(ctrl: &mut DirectoryController) {
        step_until(ctrl, |e| matches!(e, DirectoryEvent::PreloadReady(_))).await;
    }

    fn bottom() -> ScrollMetrics {
        ScrollMetrics::new(80, 20, 100)
    }

    fn names(ctrl: &DirectoryController) -> Vec<String> {
        ctrl.window().iter().map(|r| r.name.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_shows_first_page_and_preloads() {
        let mut h = harness(20, 45, None);
        let start = Instant::now();
        h.ctrl.mount();

        assert_eq!(h.ctrl.window().len(), 20);
        assert!(h.ctrl.has_more());
        assert!(!h.ctrl.is_restoring());

        settle_preload(&mut h.ctrl).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(h.ctrl.preloaded_page(), Some(1));
        assert!(!h.ctrl.is_preloading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_to_bottom_appends_preloaded_page() {
        let mut h = harness(20, 45, None);
        h.ctrl.mount();
        settle_preload(&mut h.ctrl).await;

        h.ctrl.on_scroll(bottom());
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::AdvanceCommit { .. })).await;

        assert_eq!(h.ctrl.window().len(), 40);
        assert!(h.ctrl.has_more());
        assert_eq!(h.ctrl.preloaded_page(), None, "cache consumed once");

        // next preload refills the cache for page 2
        settle_preload(&mut h.ctrl).await;
        assert_eq!(h.ctrl.preloaded_page(), Some(2));

        h.ctrl.on_scroll(ScrollMetrics::new(160, 20, 180));
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::AdvanceCommit { .. })).await;
        assert_eq!(h.ctrl.window().len(), 45);
        assert!(!h.ctrl.has_more());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_burst_is_coalesced() {
        let mut h = harness(20, 100, None);
        h.ctrl.mount();
        settle_preload(&mut h.ctrl).await;

        h.ctrl.on_scroll(ScrollMetrics::new(10, 20, 100));
        h.ctrl.on_scroll(ScrollMetrics::new(50, 20, 100));
        h.ctrl.on_scroll(bottom());

        let mut advances = 0;
        for _ in 0..4 {
            if let DirectoryEvent::AdvanceCommit { .. } = step(&mut h.ctrl).await {
                advances += 1;
            }
        }
        assert_eq!(advances, 1);
        assert_eq!(h.ctrl.window().len(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_dominates_pending_advance() {
        let mut h = harness(20, 60, None);
        h.ctrl.mount();
        settle_preload(&mut h.ctrl).await;

        h.ctrl.on_scroll(bottom());
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::ScrollSettled { .. })).await;
        assert!(h.ctrl.is_loading_more());

        // filters change while the advance is still queued
        h.ctrl.toggle_category("Food & Dining");
        let stale = step(&mut h.ctrl).await;
        assert!(matches!(stale, DirectoryEvent::AdvanceCommit { .. }));

        let expected: Vec<String> = h.ctrl.filtered()[..20].iter().map(|r| r.name.clone()).collect();
        assert_eq!(names(&h.ctrl), expected);
        assert!(h.ctrl.window().iter().all(|r| r.category == "Food & Dining"));
        assert!(!h.ctrl.is_loading_more());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_preload_is_discarded() {
        let mut h = harness(20, 60, None);
        h.ctrl.mount();
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::PreloadKick { .. })).await;
        assert!(h.ctrl.is_preloading());

        h.ctrl.set_search_term("Business 00");
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::PreloadReady(_))).await;
        assert!(!h.ctrl.is_preloading());
        assert_eq!(h.ctrl.preloaded_page(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_blocked_by_preload_retries() {
        let mut h = harness(20, 60, None);
        h.ctrl.mount();
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::PreloadKick { .. })).await;
        assert!(h.ctrl.is_preloading());

        // debounce settles while the preload is still running
        h.ctrl.on_scroll(bottom());
        h.ctrl.handle(DirectoryEvent::ScrollSettled { seq: 1 });
        assert_eq!(h.ctrl.window().len(), 20);
        assert!(!h.ctrl.is_loading_more());

        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::AdvanceCommit { .. })).await;
        assert_eq!(h.ctrl.window().len(), 40);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_debounce_applies_last_term_once() {
        let mut h = harness(20, 30, None);
        h.ctrl.mount();
        let mounted = h.ctrl.version();

        h.ctrl.type_search("B");
        h.ctrl.type_search("Business 01");
        h.ctrl.type_search("Business 012");
        assert_eq!(h.ctrl.criteria().search_term, "");

        let start = Instant::now();
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::SearchCommit { seq: 3 })).await;
        assert!(start.elapsed() >= Duration::from_millis(300));
        assert_eq!(h.ctrl.criteria().search_term, "Business 012");
        assert_eq!(h.ctrl.version(), mounted.next());
        assert_eq!(names(&h.ctrl), vec!["Business 012"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_search_records_recent() {
        let mut h = harness(20, 30, None);
        h.ctrl.mount();
        h.ctrl.type_search("business 02");
        h.ctrl.submit_search();

        assert_eq!(h.ctrl.criteria().search_term, "business 02");
        assert_eq!(h.ctrl.recent_searches()[0].term, "business 02");
        assert_eq!(h.ctrl.window().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_gives_up_after_timeout() {
        let mut h = harness(20, 45, Some("5000"));
        h.ctrl.report_layout(ScrollMetrics::new(0, 20, 1000));
        let start = Instant::now();
        h.ctrl.mount();

        assert!(h.ctrl.is_restoring());
        assert!(!h.ctrl.is_trigger_enabled());

        // scrolling during restoration never loads a page
        h.ctrl.on_scroll(ScrollMetrics::new(980, 20, 1000));

        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::RestoreTimeout { .. })).await;
        assert!(start.elapsed() >= Duration::from_millis(5000));
        assert!(!h.ctrl.is_restoring());
        assert!(h.ctrl.is_trigger_enabled());
        assert_eq!(h.ctrl.take_scroll_jump(), None);
        assert_eq!(h.ctrl.window().len(), 20);
        assert_eq!(h.session.get(SCROLL_STORAGE_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_jumps_when_content_is_tall_enough() {
        let mut h = harness(20, 45, Some("30"));
        h.ctrl.report_layout(ScrollMetrics::new(0, 20, 80));
        h.ctrl.mount();

        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::RestorePoll { .. })).await;
        assert_eq!(h.ctrl.take_scroll_jump(), Some(30));
        assert_eq!(h.session.get(SCROLL_STORAGE_KEY).unwrap(), None);
        assert!(h.ctrl.is_restoring(), "trigger stays off until settled");

        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::RestoreSettled { .. })).await;
        assert!(!h.ctrl.is_restoring());
        assert!(h.ctrl.is_trigger_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_regrows_window_for_offset_past_first_page() {
        // 20 records per page, 5 rows per record: offset 250 is on page 3
        let mut h = harness(20, 60, Some("250"));
        h.session.set(SCROLL_SHOWN_KEY, "60").unwrap();
        h.ctrl.mount();

        assert_eq!(h.ctrl.window().len(), 60);
        assert!(!h.ctrl.has_more());
        assert!(h.ctrl.is_restoring());

        h.ctrl.report_layout(ScrollMetrics::new(0, 20, 300));
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::RestorePoll { .. })).await;
        assert_eq!(h.ctrl.take_scroll_jump(), Some(250));
        assert_eq!(h.session.get(SCROLL_STORAGE_KEY).unwrap(), None);
        assert_eq!(h.session.get(SCROLL_SHOWN_KEY).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regrown_window_preloads_following_page() {
        let mut h = harness(20, 70, Some("150"));
        h.session.set(SCROLL_SHOWN_KEY, "40").unwrap();
        h.ctrl.mount();
        assert_eq!(h.ctrl.window().len(), 40);
        assert!(h.ctrl.has_more());

        settle_preload(&mut h.ctrl).await;
        assert_eq!(h.ctrl.preloaded_page(), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_saved_offset_is_ignored() {
        let mut h = harness(20, 45, Some("not-a-number"));
        h.ctrl.mount();
        assert!(!h.ctrl.is_restoring());
        assert!(h.ctrl.is_trigger_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_round_trip_keeps_window_and_offset() {
        let mut h = harness(20, 60, None);
        h.ctrl.mount();
        settle_preload(&mut h.ctrl).await;
        h.ctrl.on_scroll(bottom());
        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::AdvanceCommit { .. })).await;
        let before = names(&h.ctrl);

        h.ctrl.report_layout(ScrollMetrics::new(123, 20, 200));
        h.ctrl.open_detail("biz-25").unwrap();
        assert_eq!(h.ctrl.view(), View::Detail);
        assert_eq!(h.ctrl.detail().unwrap().name, "Business 025");

        h.ctrl.close_detail();
        assert!(h.ctrl.is_restoring());
        assert_eq!(h.ctrl.take_scroll_jump(), None, "jump waits for a painted frame");

        h.ctrl.on_frame_rendered();
        assert_eq!(h.ctrl.take_scroll_jump(), Some(123));
        assert_eq!(names(&h.ctrl), before);

        step_until(&mut h.ctrl, |e| matches!(e, DirectoryEvent::ReturnSettled { .. })).await;
        assert!(!h.ctrl.is_restoring());
        assert!(h.ctrl.is_trigger_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_unknown_record() {
        let mut h = harness(20, 5, None);
        h.ctrl.mount();
        assert!(matches!(
            h.ctrl.open_detail("missing"),
            Err(Error::RecordNotFound(_))
        ));
        assert_eq!(h.ctrl.view(), View::List);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persist_scroll_offset() {
        let mut h = harness(20, 45, None);
        h.ctrl.mount();
        h.ctrl.report_layout(ScrollMetrics::new(64, 20, 200));
        h.ctrl.persist_scroll_offset();
        assert_eq!(h.session.get(SCROLL_STORAGE_KEY).unwrap().as_deref(), Some("64"));
        assert_eq!(h.session.get(SCROLL_SHOWN_KEY).unwrap().as_deref(), Some("20"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_filters_and_saved_toggle() {
        let mut h = harness(20, 45, None);
        h.ctrl.mount();
        h.ctrl.toggle_certification("BMC Member");
        assert_eq!(h.ctrl.filtered().len(), 23);
        assert_eq!(h.ctrl.criteria().active_filter_count(), 1);

        h.ctrl.clear_filters();
        assert_eq!(h.ctrl.filtered().len(), 45);

        assert!(h.ctrl.toggle_saved("biz-3").unwrap());
        assert_eq!(h.ctrl.saved_count(), 1);
        assert!(h.ctrl.is_saved(&h.ctrl.window()[3]));
        assert_eq!(h.ctrl.filtered().len(), 45, "saved is not a filter");
    }
}
