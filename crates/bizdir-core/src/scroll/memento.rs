use std::sync::Arc;

use crate::storage::KeyValueStore;

/// Session-store key holding the list offset to restore after a reload
pub const SCROLL_STORAGE_KEY: &str = "directory_scroll";
/// Session-store key holding how many records were displayed at that offset
pub const SCROLL_SHOWN_KEY: &str = "directory_scroll_shown";

/// Offset saved when the user opens a detail view.
///
/// On return the jump is deferred until the list has painted once, so the
/// host must report a rendered frame before [`on_paint`](Self::on_paint)
/// hands back the offset.
#[derive(Debug, Clone, Default)]
pub struct NavigationMemento {
    saved: Option<u32>,
    awaiting_paint: bool,
}

impl NavigationMemento {
    pub fn capture(&mut self, offset: u32) {
        self.saved = Some(offset);
        self.awaiting_paint = false;
    }

    pub fn saved(&self) -> Option<u32> {
        self.saved
    }

    /// Start the return to the list. Returns false when nothing was captured.
    pub fn begin_return(&mut self) -> bool {
        self.awaiting_paint = self.saved.is_some();
        self.awaiting_paint
    }

    pub fn is_awaiting_paint(&self) -> bool {
        self.awaiting_paint
    }

    /// A frame was painted; yields the offset to jump to exactly once
    pub fn on_paint(&mut self) -> Option<u32> {
        if !self.awaiting_paint {
            return None;
        }
        self.awaiting_paint = false;
        self.saved.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    Idle,
    /// Waiting for enough content to scroll to `target`
    Polling { target: u32 },
    /// Jump done; trigger stays off until the settle delay passes
    Settling,
}

/// Outcome of one height poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Ready(u32),
    Wait,
    Stale,
}

/// Restores the list offset persisted by the previous session.
///
/// Every restoration gets a session number; timer events carrying an older
/// session are ignored so a timeout can never clobber a later restore.
pub struct ReloadMemento {
    store: Arc<dyn KeyValueStore>,
    phase: RestorePhase,
    session: u64,
    shown: Option<usize>,
}

impl std::fmt::Debug for ReloadMemento {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadMemento")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("shown", &self.shown)
            .finish()
    }
}

impl ReloadMemento {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            phase: RestorePhase::Idle,
            session: 0,
            shown: None,
        }
    }

    pub fn phase(&self) -> RestorePhase {
        self.phase
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn is_active(&self) -> bool {
        self.phase != RestorePhase::Idle
    }

    /// Records that were displayed when the offset was saved, if recorded.
    /// Set by [`begin`](Self::begin).
    pub fn shown(&self) -> Option<usize> {
        self.shown
    }

    /// Read the persisted offset and start polling for it. Returns the new
    /// session and target, or `None` when there is nothing usable to restore.
    pub fn begin(&mut self) -> Option<(u64, u32)> {
        let target = parse_offset(self.read(SCROLL_STORAGE_KEY).as_deref())?;
        self.shown = parse_offset(self.read(SCROLL_SHOWN_KEY).as_deref()).map(|n| n as usize);

        self.session += 1;
        self.phase = RestorePhase::Polling { target };
        tracing::debug!(
            target,
            shown = ?self.shown,
            session = self.session,
            "Restoring scroll offset"
        );
        Some((self.session, target))
    }

    /// Check whether the content has grown enough to hold the target offset
    pub fn poll(&mut self, session: u64, content_height: u32, viewport_height: u32) -> PollOutcome {
        let RestorePhase::Polling { target } = self.phase else {
            return PollOutcome::Stale;
        };
        if session != self.session {
            return PollOutcome::Stale;
        }

        let needed = target as f64 + 0.5 * viewport_height as f64;
        if (content_height as f64) < needed {
            return PollOutcome::Wait;
        }

        self.clear_key();
        self.phase = RestorePhase::Settling;
        PollOutcome::Ready(target)
    }

    /// Give up on a restoration that never found enough content. Returns
    /// true when the timeout applied to the running session.
    pub fn time_out(&mut self, session: u64) -> bool {
        if session != self.session || !matches!(self.phase, RestorePhase::Polling { .. }) {
            return false;
        }
        tracing::debug!(session, "Scroll restoration timed out");
        self.clear_key();
        self.phase = RestorePhase::Idle;
        true
    }

    /// Finish the settle delay after a successful jump
    pub fn settle(&mut self, session: u64) -> bool {
        if session != self.session || self.phase != RestorePhase::Settling {
            return false;
        }
        self.phase = RestorePhase::Idle;
        true
    }

    /// Abandon any restoration in progress without touching the store
    pub fn cancel(&mut self) {
        if self.is_active() {
            self.session += 1;
            self.phase = RestorePhase::Idle;
        }
    }

    /// Save `offset` and the number of records displayed for the next session
    pub fn persist(&self, offset: u32, shown: usize) {
        for (key, value) in [(SCROLL_STORAGE_KEY, offset as usize), (SCROLL_SHOWN_KEY, shown)] {
            if let Err(e) = self.store.set(key, &value.to_string()) {
                tracing::warn!("Failed to persist {}: {}", key, e);
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    fn clear_key(&self) {
        for key in [SCROLL_STORAGE_KEY, SCROLL_SHOWN_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Failed to clear {}: {}", key, e);
            }
        }
    }
}

/// A saved offset is usable only when it is a positive integer
pub fn parse_offset(raw: Option<&str>) -> Option<u32> {
    let value: i64 = raw?.trim().parse().ok()?;
    if value <= 0 {
        return None;
    }
    Some(u32::try_from(value).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn memento_with(value: Option<&str>) -> (ReloadMemento, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        if let Some(value) = value {
            store.set(SCROLL_STORAGE_KEY, value).unwrap();
        }
        (ReloadMemento::new(store.clone()), store)
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset(None), None);
        assert_eq!(parse_offset(Some("abc")), None);
        assert_eq!(parse_offset(Some("0")), None);
        assert_eq!(parse_offset(Some("-40")), None);
        assert_eq!(parse_offset(Some("12.5")), None);
        assert_eq!(parse_offset(Some(" 480 ")), Some(480));
    }

    #[test]
    fn test_navigation_round_trip() {
        let mut memento = NavigationMemento::default();
        memento.capture(37);

        assert!(memento.begin_return());
        assert!(memento.is_awaiting_paint());
        assert_eq!(memento.on_paint(), Some(37));
        assert_eq!(memento.on_paint(), None);
        assert!(!memento.begin_return());
    }

    #[test]
    fn test_restore_without_saved_value() {
        let (mut memento, _) = memento_with(None);
        assert!(memento.begin().is_none());
        assert!(!memento.is_active());

        let (mut memento, _) = memento_with(Some("garbage"));
        assert!(memento.begin().is_none());
    }

    #[test]
    fn test_persisted_count_round_trip() {
        let (memento, store) = memento_with(None);
        memento.persist(150, 60);

        let mut next = ReloadMemento::new(store.clone());
        assert_eq!(next.begin().map(|(_, target)| target), Some(150));
        assert_eq!(next.shown(), Some(60));

        let session = next.session();
        assert_eq!(next.poll(session, 200, 20), PollOutcome::Ready(150));
        assert_eq!(store.get(SCROLL_SHOWN_KEY).unwrap(), None);
    }

    #[test]
    fn test_restore_waits_for_content() {
        let (mut memento, store) = memento_with(Some("100"));
        let (session, target) = memento.begin().unwrap();
        assert_eq!(target, 100);

        assert_eq!(memento.poll(session, 100, 20), PollOutcome::Wait);
        assert_eq!(memento.poll(session, 110, 20), PollOutcome::Ready(100));
        assert_eq!(memento.phase(), RestorePhase::Settling);
        assert_eq!(store.get(SCROLL_STORAGE_KEY).unwrap(), None);

        assert!(memento.settle(session));
        assert!(!memento.is_active());
    }

    #[test]
    fn test_timeout_clears_key_and_stale_events() {
        let (mut memento, store) = memento_with(Some("5000"));
        let (session, _) = memento.begin().unwrap();

        assert_eq!(memento.poll(session, 1000, 20), PollOutcome::Wait);
        assert!(memento.time_out(session));
        assert!(!memento.is_active());
        assert_eq!(store.get(SCROLL_STORAGE_KEY).unwrap(), None);

        assert_eq!(memento.poll(session, 99_999, 20), PollOutcome::Stale);
        assert!(!memento.time_out(session));
    }

    #[test]
    fn test_timeout_after_success_is_ignored() {
        let (mut memento, _) = memento_with(Some("10"));
        let (session, _) = memento.begin().unwrap();
        assert_eq!(memento.poll(session, 100, 20), PollOutcome::Ready(10));
        assert!(!memento.time_out(session));
        assert_eq!(memento.phase(), RestorePhase::Settling);
    }
}
