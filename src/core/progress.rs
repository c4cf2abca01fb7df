//! Cooperative progress reporting.
//!
//! Long-running operations accept an optional `&dyn ProgressRatio` and report
//! coarse checkpoints through it. Reporting never blocks and carries no
//! cancellation semantics.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sink for `step / total` progress updates.
///
/// Implementations must be cheap and thread-safe: several read-only
/// reconstruction queries may report through their own sinks concurrently.
///
/// # Examples
///
/// ```rust
/// use cocone::core::progress::{AtomicProgress, ProgressRatio};
///
/// let progress = AtomicProgress::default();
/// progress.set(1, 4);
/// assert_eq!(progress.ratio(), 0.25);
/// ```
pub trait ProgressRatio: Send + Sync {
    /// Record that `step` of `total` units are done.
    fn set(&self, step: u64, total: u64);

    /// Describe the running operation. `%v` and `%m` stand for the current
    /// step and the total in the text.
    fn set_text(&self, _text: &str) {}
}

/// Forward a checkpoint to an optional sink.
#[inline]
pub(crate) fn report(progress: Option<&dyn ProgressRatio>, step: u64, total: u64) {
    if let Some(progress) = progress {
        progress.set(step, total);
    }
}

/// Forward a description to an optional sink.
#[inline]
pub(crate) fn report_text(progress: Option<&dyn ProgressRatio>, text: &str) {
    if let Some(progress) = progress {
        progress.set_text(text);
    }
}

/// Lock-free progress holder that observers can poll.
#[derive(Debug, Default)]
pub struct AtomicProgress {
    step: AtomicU64,
    total: AtomicU64,
    updates: AtomicU64,
    text: Mutex<String>,
}

impl AtomicProgress {
    /// Last reported ratio in `[0, 1]`, or `0.0` before the first report.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let step = self.step.load(Ordering::Relaxed).min(total);
        step as f64 / total as f64
    }

    /// Number of `set` calls received.
    #[must_use]
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Last description, empty before the first `set_text`.
    #[must_use]
    pub fn text(&self) -> String {
        self.text
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |text| text.clone())
    }
}

impl ProgressRatio for AtomicProgress {
    fn set(&self, step: u64, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.step.store(step, Ordering::Relaxed);
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    fn set_text(&self, text: &str) {
        let mut guard = self
            .text
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        text.clone_into(&mut guard);
    }
}
