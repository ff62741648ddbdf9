mod preload;
mod window;

pub use preload::{PreloadRequest, PreloadedPage, Preloader};
pub use window::{AdvanceOutcome, WindowingController};

/// Filter generation. Bumped on every reset; async work carries the version
/// it was scheduled under and is discarded when that version is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilterVersion(u64);

impl FilterVersion {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl std::fmt::Display for FilterVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}
