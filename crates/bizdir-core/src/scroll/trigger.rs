use std::time::Duration;

use super::ScrollMetrics;

/// Controller state the trigger consults before requesting a page
#[derive(Debug, Clone, Copy, Default)]
pub struct TriggerGates {
    pub has_more: bool,
    pub advance_pending: bool,
    pub preload_pending: bool,
    pub window_len: usize,
    pub restoring: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    FullyLoaded,
    AdvancePending,
    PreloadPending,
    EmptyWindow,
    Restoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Request the next page
    Fire,
    /// Threshold not reached
    Below,
    /// Threshold reached but a gate is closed
    Blocked(BlockReason),
    /// A newer scroll event replaced this one
    Superseded,
    /// Trigger disabled or nothing to evaluate
    Idle,
}

/// Debounced "near the bottom" detector.
///
/// Each scroll event gets a sequence number; the host schedules a settle
/// callback after [`debounce`](Self::debounce) and only the latest sequence
/// is evaluated.
#[derive(Debug, Clone)]
pub struct ScrollTrigger {
    threshold: f64,
    debounce: Duration,
    seq: u64,
    latest: Option<ScrollMetrics>,
    enabled: bool,
    deferred: bool,
}

impl ScrollTrigger {
    pub fn new(threshold: f64, debounce: Duration) -> Self {
        Self {
            threshold,
            debounce,
            seq: 0,
            latest: None,
            enabled: true,
            deferred: false,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn latest(&self) -> Option<ScrollMetrics> {
        self.latest
    }

    /// Record a scroll event. Returns the sequence number to settle after the
    /// debounce period, or `None` while disabled.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        self.latest = Some(metrics);
        self.deferred = false;
        self.seq += 1;
        Some(self.seq)
    }

    /// Keep the latest geometry current without scheduling an evaluation
    pub fn observe(&mut self, metrics: ScrollMetrics) {
        self.latest = Some(metrics);
    }

    /// Enable or disable the trigger. Disabling cancels the pending
    /// evaluation and any deferred retry.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.seq += 1;
            self.deferred = false;
        }
        self.enabled = enabled;
    }

    /// Debounce timer fired for `seq`
    pub fn settle(&mut self, seq: u64, gates: TriggerGates) -> Evaluation {
        if seq != self.seq {
            return Evaluation::Superseded;
        }
        self.evaluate_latest(gates)
    }

    /// Retry an evaluation that was blocked by in-flight work, if any
    pub fn retry_deferred(&mut self, gates: TriggerGates) -> Evaluation {
        if !self.deferred {
            return Evaluation::Idle;
        }
        self.deferred = false;
        self.evaluate_latest(gates)
    }

    fn evaluate_latest(&mut self, gates: TriggerGates) -> Evaluation {
        if !self.enabled {
            return Evaluation::Idle;
        }
        let Some(metrics) = self.latest else {
            return Evaluation::Idle;
        };
        let evaluation = self.evaluate(metrics, gates);
        if let Evaluation::Blocked(BlockReason::AdvancePending | BlockReason::PreloadPending) =
            evaluation
        {
            self.deferred = true;
        }
        evaluation
    }

    /// Pure decision for one set of metrics
    pub fn evaluate(&self, metrics: ScrollMetrics, gates: TriggerGates) -> Evaluation {
        if metrics.ratio() < self.threshold {
            return Evaluation::Below;
        }
        let blocked = if gates.restoring {
            Some(BlockReason::Restoring)
        } else if !gates.has_more {
            Some(BlockReason::FullyLoaded)
        } else if gates.window_len == 0 {
            Some(BlockReason::EmptyWindow)
        } else if gates.advance_pending {
            Some(BlockReason::AdvancePending)
        } else if gates.preload_pending {
            Some(BlockReason::PreloadPending)
        } else {
            None
        };
        match blocked {
            Some(reason) => {
                tracing::debug!(?reason, ratio = metrics.ratio(), "Scroll trigger blocked");
                Evaluation::Blocked(reason)
            }
            None => {
                tracing::debug!(ratio = metrics.ratio(), "Scroll trigger fired");
                Evaluation::Fire
            }
        }
    }
}
