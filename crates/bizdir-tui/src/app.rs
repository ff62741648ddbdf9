use std::sync::Arc;

use bizdir_core::catalog::Record;
use bizdir_core::filter::CERTIFICATION_OPTIONS;
use bizdir_core::paging::FilterVersion;
use bizdir_core::scroll::ScrollMetrics;
use bizdir_core::{AppConfig, DirectoryController, View};

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Browsing the list or a detail view
    Normal,
    /// Typing into the search bar
    Search,
    /// Category / certification picker overlay
    FilterPicker,
    /// Help overlay
    Help,
}

/// One row of the filter picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOption {
    Category(String),
    Certification(&'static str),
}

impl FilterOption {
    pub fn label(&self) -> &str {
        match self {
            FilterOption::Category(name) => name,
            FilterOption::Certification(label) => label,
        }
    }
}

/// Application state
///
/// The list is laid out as fixed-height cards, so the scroll offset is
/// measured in terminal rows and every card is `ui.card_height` rows tall.
pub struct App {
    pub config: Arc<AppConfig>,
    pub directory: DirectoryController,
    pub mode: Mode,
    /// Selected index into the display window
    pub selected: usize,
    /// First visible row of the list
    pub list_offset: u32,
    /// Rows available to the list, updated on every draw
    pub viewport_rows: u16,
    pub detail_scroll: u16,
    pub picker_cursor: usize,
    /// Recent search highlighted in the search bar
    pub recent_cursor: Option<usize>,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// Pending key for multi-key sequences (e.g., 'gg')
    pub pending_key: Option<char>,
    seen_version: FilterVersion,
    fill_checked: Option<(FilterVersion, usize)>,
}

impl App {
    /// Wrap a controller and mount it. Must run inside a tokio runtime.
    pub fn new(config: Arc<AppConfig>, mut directory: DirectoryController) -> Self {
        directory.mount();
        let seen_version = directory.version();
        Self {
            config,
            directory,
            mode: Mode::Normal,
            selected: 0,
            list_offset: 0,
            viewport_rows: 0,
            detail_scroll: 0,
            picker_cursor: 0,
            recent_cursor: None,
            should_quit: false,
            status_message: None,
            pending_key: None,
            seen_version,
            fill_checked: None,
        }
    }

    pub fn card_height(&self) -> u32 {
        self.config.ui.card_height.max(1) as u32
    }

    pub fn content_rows(&self) -> u32 {
        self.directory.window().len() as u32 * self.card_height()
    }

    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(
            self.list_offset,
            self.viewport_rows as u32,
            self.content_rows(),
        )
    }

    /// Drain directory events and fold their effects into the view state.
    /// Called once per loop iteration before drawing.
    pub fn sync(&mut self) {
        self.directory.pump();

        if self.directory.version() != self.seen_version {
            self.seen_version = self.directory.version();
            self.selected = 0;
            self.list_offset = 0;
        }

        if let Some(jump) = self.directory.take_scroll_jump() {
            self.list_offset = jump.min(self.metrics().max_scroll());
            if !self.selection_visible() {
                self.selected = self.list_offset.div_ceil(self.card_height()) as usize;
            }
            tracing::debug!(offset = self.list_offset, "Applied scroll jump");
        }

        let len = self.directory.window().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Report the painted layout to the directory. Called after every draw.
    pub fn after_frame(&mut self) {
        let metrics = self.metrics();
        self.directory.report_layout(metrics);
        self.directory.on_frame_rendered();

        // A page that does not fill the viewport can never be scrolled, so
        // treat it as scrolled to the bottom once per window size. Not while
        // the trigger is off: the scroll would be dropped.
        let key = (self.directory.version(), self.directory.window().len());
        if self.directory.view() == View::List
            && self.directory.is_trigger_enabled()
            && self.viewport_rows > 0
            && metrics.scroll_height <= metrics.viewport_height
            && self.directory.has_more()
            && self.fill_checked != Some(key)
        {
            self.fill_checked = Some(key);
            self.directory.on_scroll(metrics);
        }
    }

    pub fn selected_record(&self) -> Option<Arc<Record>> {
        self.directory.window().get(self.selected).cloned()
    }

    /// Record shown in the detail view, else the selected list record
    pub fn focused_record(&self) -> Option<Arc<Record>> {
        self.directory
            .detail()
            .cloned()
            .or_else(|| self.selected_record())
    }

    pub fn move_down(&mut self) {
        if self.directory.view() == View::Detail {
            self.detail_scroll = self.detail_scroll.saturating_add(1);
            return;
        }
        let len = self.directory.window().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
        self.follow_selection();
    }

    pub fn move_up(&mut self) {
        if self.directory.view() == View::Detail {
            self.detail_scroll = self.detail_scroll.saturating_sub(1);
            return;
        }
        self.selected = self.selected.saturating_sub(1);
        self.follow_selection();
    }

    pub fn page_down(&mut self) {
        let step = self.cards_per_page();
        let len = self.directory.window().len();
        self.selected = (self.selected + step).min(len.saturating_sub(1));
        self.follow_selection();
    }

    pub fn page_up(&mut self) {
        let step = self.cards_per_page();
        self.selected = self.selected.saturating_sub(step);
        self.follow_selection();
    }

    pub fn jump_to_top(&mut self) {
        self.selected = 0;
        self.follow_selection();
    }

    pub fn jump_to_bottom(&mut self) {
        self.selected = self.directory.window().len().saturating_sub(1);
        self.follow_selection();
    }

    fn selection_visible(&self) -> bool {
        let top = self.selected as u32 * self.card_height();
        top >= self.list_offset
            && top + self.card_height() <= self.list_offset + self.viewport_rows as u32
    }

    fn cards_per_page(&self) -> usize {
        ((self.viewport_rows as u32 / self.card_height()).max(1)) as usize
    }

    /// Scroll so the selected card is fully visible, then report the scroll
    fn follow_selection(&mut self) {
        let card = self.card_height();
        let top = self.selected as u32 * card;
        let viewport = self.viewport_rows as u32;

        if top < self.list_offset {
            self.list_offset = top;
        } else if top + card > self.list_offset + viewport {
            self.list_offset = (top + card).saturating_sub(viewport);
        }
        self.directory.on_scroll(self.metrics());
    }

    pub fn open_selected(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        match self.directory.open_detail(record.key()) {
            Ok(()) => self.detail_scroll = 0,
            Err(e) => self.set_status(format!("Cannot open {}: {}", record.name, e)),
        }
    }

    pub fn close_detail(&mut self) {
        self.directory.close_detail();
    }

    pub fn toggle_saved(&mut self) {
        let Some(record) = self.focused_record() else {
            return;
        };
        match self.directory.toggle_saved(record.key()) {
            Ok(true) => self.set_status(format!("Saved {}", record.name)),
            Ok(false) => self.set_status(format!("Removed {} from saved", record.name)),
            Err(e) => self.set_status(format!("Save failed: {}", e)),
        }
    }

    /// Open the focused record's website in the default browser
    pub fn open_contact(&mut self) {
        let Some(record) = self.focused_record() else {
            return;
        };
        let Some(url) = record.contact_url() else {
            self.set_status(format!("{} has no website", record.name));
            return;
        };
        match open::that(url.as_str()) {
            Ok(()) => self.set_status(format!("Opened {}", url)),
            Err(e) => {
                tracing::warn!("Failed to open {}: {}", url, e);
                self.set_status(format!("Failed to open browser: {}", e));
            }
        }
    }

    pub fn start_search(&mut self) {
        self.mode = Mode::Search;
        self.recent_cursor = None;
    }

    pub fn search_input_char(&mut self, c: char) {
        let mut text = self.directory.search_input().to_string();
        text.push(c);
        self.recent_cursor = None;
        self.directory.type_search(text);
    }

    pub fn search_backspace(&mut self) {
        let mut text = self.directory.search_input().to_string();
        text.pop();
        self.recent_cursor = None;
        self.directory.type_search(text);
    }

    pub fn confirm_search(&mut self) {
        self.directory.submit_search();
        self.mode = Mode::Normal;
        self.recent_cursor = None;
    }

    /// Leave the search bar and drop the search term
    pub fn cancel_search(&mut self) {
        self.directory.set_search_term("");
        self.mode = Mode::Normal;
        self.recent_cursor = None;
    }

    /// Fill the search bar with the next recent search
    pub fn cycle_recent(&mut self) {
        let count = self.directory.recent_searches().len();
        if count == 0 {
            return;
        }
        let next = self.recent_cursor.map(|i| (i + 1) % count).unwrap_or(0);
        self.recent_cursor = Some(next);
        let term = self.directory.recent_searches()[next].term.clone();
        self.directory.type_search(term);
    }

    pub fn remove_recent(&mut self) {
        let Some(index) = self.recent_cursor else {
            return;
        };
        if let Some(entry) = self.directory.recent_searches().get(index) {
            let id = entry.id;
            self.directory.remove_recent_search(id);
        }
        let count = self.directory.recent_searches().len();
        self.recent_cursor = if count == 0 {
            None
        } else {
            Some(index.min(count - 1))
        };
    }

    pub fn open_filter_picker(&mut self) {
        self.mode = Mode::FilterPicker;
        self.picker_cursor = 0;
    }

    /// Categories present in the catalog followed by certification labels
    pub fn filter_options(&self) -> Vec<FilterOption> {
        self.directory
            .categories()
            .into_iter()
            .map(FilterOption::Category)
            .chain(
                CERTIFICATION_OPTIONS
                    .iter()
                    .map(|label| FilterOption::Certification(label)),
            )
            .collect()
    }

    pub fn is_option_active(&self, option: &FilterOption) -> bool {
        let criteria = self.directory.criteria();
        match option {
            FilterOption::Category(name) => criteria.categories.contains(name),
            FilterOption::Certification(label) => criteria.certifications.contains(*label),
        }
    }

    pub fn picker_down(&mut self) {
        let count = self.filter_options().len();
        if self.picker_cursor + 1 < count {
            self.picker_cursor += 1;
        }
    }

    pub fn picker_up(&mut self) {
        self.picker_cursor = self.picker_cursor.saturating_sub(1);
    }

    pub fn toggle_picker_option(&mut self) {
        let Some(option) = self.filter_options().into_iter().nth(self.picker_cursor) else {
            return;
        };
        match option {
            FilterOption::Category(name) => self.directory.toggle_category(&name),
            FilterOption::Certification(label) => self.directory.toggle_certification(label),
        }
    }

    pub fn clear_filters(&mut self) {
        self.directory.clear_filters();
        self.set_status("Filters cleared");
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn is_input_mode(&self) -> bool {
        self.mode == Mode::Search
    }

    pub fn clear_pending_key(&mut self) {
        self.pending_key = None;
    }

    /// Save the list offset for the next launch and stop the loop
    pub fn quit(&mut self) {
        self.directory.persist_scroll_offset();
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdir_core::scroll::SCROLL_STORAGE_KEY;
    use bizdir_core::storage::{KeyValueStore, MemoryStore};
    use bizdir_core::{Catalog, DirectoryEvent};
    use std::time::Duration;

    fn app(records: usize) -> App {
        app_with_session(records, Arc::new(MemoryStore::new()))
    }

    fn app_with_session(records: usize, session: Arc<dyn KeyValueStore>) -> App {
        let records = (0..records)
            .map(|i| {
                let mut r = Record::new(format!("Shop {i:02}"), if i % 2 == 0 { "Retail" } else { "Health" });
                r.id = Some(format!("shop-{i}"));
                r
            })
            .collect();
        let config = Arc::new(AppConfig::default());
        let local: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let directory = DirectoryController::new(&config, Catalog::new(records), local, session);
        let mut app = App::new(config, directory);
        app.viewport_rows = 20;
        app
    }

    async fn run_until(app: &mut App, mut done: impl FnMut(&DirectoryEvent) -> bool) {
        for _ in 0..1000 {
            let event = tokio::time::timeout(Duration::from_secs(60), app.directory.next_event())
                .await
                .expect("no directory event")
                .expect("queues closed");
            let stop = done(&event);
            app.directory.handle(event);
            if stop {
                app.sync();
                return;
            }
        }
        panic!("condition never reached");
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_scrolls_list() {
        let mut app = app(30);
        for _ in 0..6 {
            app.move_down();
        }
        assert_eq!(app.selected, 6);
        // card 6 spans rows 24..28, viewport is 20 rows
        assert_eq!(app.list_offset, 8);

        app.jump_to_top();
        assert_eq!(app.list_offset, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaching_bottom_loads_next_page() {
        let mut app = app(30);
        app.jump_to_bottom();
        assert_eq!(app.selected, 19);

        run_until(&mut app, |e| matches!(e, DirectoryEvent::AdvanceCommit { .. })).await;
        assert_eq!(app.directory.window().len(), 30);
        assert_eq!(app.selected, 19, "appending keeps the selection");
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_change_resets_view() {
        let mut app = app(30);
        app.page_down();
        assert!(app.list_offset > 0);

        app.open_filter_picker();
        let health = app
            .filter_options()
            .iter()
            .position(|o| o.label() == "Health")
            .unwrap();
        app.picker_cursor = health;
        app.toggle_picker_option();
        app.sync();

        assert_eq!(app.selected, 0);
        assert_eq!(app.list_offset, 0);
        assert!(app.directory.window().iter().all(|r| r.category == "Health"));
        assert!(app.is_option_active(&FilterOption::Category("Health".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_return_restores_offset() {
        let mut app = app(30);
        app.page_down();
        app.after_frame();
        let offset = app.list_offset;
        let selected = app.selected;

        app.open_selected();
        assert_eq!(app.directory.view(), View::Detail);
        app.list_offset = 0;

        app.close_detail();
        app.sync();
        assert_eq!(app.list_offset, 0, "jump waits for a painted frame");

        app.after_frame();
        app.sync();
        assert_eq!(app.list_offset, offset);
        assert_eq!(app.selected, selected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_page_fills_viewport() {
        let mut app = app(30);
        app.viewport_rows = 200;
        app.after_frame();

        run_until(&mut app, |e| matches!(e, DirectoryEvent::AdvanceCommit { .. })).await;
        assert_eq!(app.directory.window().len(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_page_fills_viewport_after_restore_gives_up() {
        let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        session.set(SCROLL_STORAGE_KEY, "500").unwrap();
        let mut app = app_with_session(60, session);
        app.viewport_rows = 200;

        // trigger is off while restoring, so this frame cannot load more
        app.after_frame();
        run_until(&mut app, |e| matches!(e, DirectoryEvent::RestoreTimeout { .. })).await;
        assert!(!app.directory.is_restoring());
        assert_eq!(app.directory.window().len(), 20);

        app.after_frame();
        run_until(&mut app, |e| matches!(e, DirectoryEvent::AdvanceCommit { .. })).await;
        assert!(app.directory.window().len() > 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_offset_past_first_page_survives_relaunch() {
        let session: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut app = app_with_session(60, session.clone());
        while app.directory.has_more() {
            app.jump_to_bottom();
            run_until(&mut app, |e| matches!(e, DirectoryEvent::AdvanceCommit { .. })).await;
        }
        app.jump_to_bottom();
        assert_eq!(app.selected, 59);
        // 60 cards of 4 rows in a 20-row viewport
        assert_eq!(app.list_offset, 220);
        app.quit();

        let mut app = app_with_session(60, session);
        assert_eq!(app.directory.window().len(), 60);
        app.sync();
        app.after_frame();
        run_until(&mut app, |e| matches!(e, DirectoryEvent::RestorePoll { .. })).await;
        assert_eq!(app.list_offset, 220);
        assert_eq!(app.selected, 55);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_typing_and_recent_cycle() {
        let mut app = app(30);
        app.start_search();
        for c in "shop 0".chars() {
            app.search_input_char(c);
        }
        app.confirm_search();
        app.sync();
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.directory.window().len(), 10);

        app.start_search();
        app.cycle_recent();
        assert_eq!(app.directory.search_input(), "shop 0");
        app.remove_recent();
        assert!(app.directory.recent_searches().is_empty());
        assert_eq!(app.recent_cursor, None);
    }
}
