//! Thread-safe progress accounting for renders.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Counts finished pixels and carries a cooperative cancellation flag.
///
/// Render workers increment it concurrently; any other thread may read it
/// or request cancellation. Workers check the flag once per pixel.
#[derive(Debug, Default)]
pub struct RenderProgress {
    count: AtomicU64,
    expected: AtomicU64,
    cancelled: AtomicBool,
}

impl RenderProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new pass expecting `expected` increments.
    ///
    /// Cancellation is sticky and survives a reset.
    pub fn reset(&self, expected: u64) {
        self.count.store(0, Ordering::Relaxed);
        self.expected.store(expected, Ordering::Relaxed);
    }

    pub fn add(&self, increment: u64) {
        self.count.fetch_add(increment, Ordering::Relaxed);
    }

    pub fn increment(&self) {
        self.add(1);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn expected_count(&self) -> u64 {
        self.expected.load(Ordering::Relaxed)
    }

    /// Completed fraction in `[0, 1]`; an empty pass counts as complete.
    pub fn fraction(&self) -> f32 {
        let expected = self.expected_count();
        if expected == 0 {
            return 1.0;
        }
        (self.count() as f64 / expected as f64).min(1.0) as f32
    }

    pub fn is_complete(&self) -> bool {
        self.count() >= self.expected_count()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
