//! Scroll-driven paging: the trigger that requests the next page and the
//! mementos that restore the list offset across navigation and reloads.

mod memento;
mod trigger;

pub use memento::{
    parse_offset, NavigationMemento, PollOutcome, ReloadMemento, RestorePhase, SCROLL_SHOWN_KEY,
    SCROLL_STORAGE_KEY,
};
pub use trigger::{BlockReason, Evaluation, ScrollTrigger, TriggerGates};

/// Geometry of the scrollable list container, in rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub viewport_height: u32,
    pub scroll_height: u32,
}

impl ScrollMetrics {
    pub fn new(scroll_top: u32, viewport_height: u32, scroll_height: u32) -> Self {
        Self {
            scroll_top,
            viewport_height,
            scroll_height,
        }
    }

    /// `(scroll_top + viewport_height) / scroll_height`; content that fits in
    /// the viewport counts as fully scrolled.
    pub fn ratio(&self) -> f64 {
        if self.scroll_height == 0 {
            return 1.0;
        }
        (self.scroll_top as f64 + self.viewport_height as f64) / self.scroll_height as f64
    }

    /// Largest offset that keeps the viewport filled
    pub fn max_scroll(&self) -> u32 {
        self.scroll_height.saturating_sub(self.viewport_height)
    }
}
