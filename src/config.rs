use std::time::Duration;

/// Configuration for [`crate::MtCircularBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of slots in the ring.
    pub capacity: usize,
    /// Deadline applied to every blocking primitive (per-slot lock, global
    /// lock, availability wait) unless a call-specific `*_timeout` override
    /// is used.
    pub lock_timeout: Duration,
    /// Enable metrics collection (slight overhead: a handful of atomic
    /// increments per call).
    pub enable_metrics: bool,
}

impl Config {
    /// Creates a new configuration with custom settings.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. A zero-capacity buffer can never bind a
    /// write handle, so rejecting it at construction time is cheaper to
    /// reason about than rendering every subsequent call inoperative.
    #[must_use]
    pub const fn new(capacity: usize, lock_timeout: Duration, enable_metrics: bool) -> Self {
        assert!(capacity > 0, "capacity must be at least 1");

        Self {
            capacity,
            lock_timeout,
            enable_metrics,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 16,
            lock_timeout: Duration::from_secs(1),
            enable_metrics: false,
        }
    }
}
