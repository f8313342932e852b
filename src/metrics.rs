use std::sync::atomic::{AtomicU64, Ordering};

/// Optional metrics for monitoring buffer activity.
///
/// Collection is gated by [`crate::Config::enable_metrics`]; when disabled,
/// every increment is skipped so the cost is a single branch rather than an
/// atomic RMW.
#[derive(Debug, Default)]
pub(crate) struct Metrics {
    writes_completed: AtomicU64,
    overwrites: AtomicU64,
    peek_reads: AtomicU64,
    consumes_completed: AtomicU64,
    slot_acq_timeouts: AtomicU64,
    data_available_timeouts: AtomicU64,
}

impl Metrics {
    pub(crate) fn record_write(&self, enabled: bool, overwrite: bool) {
        if !enabled {
            return;
        }
        self.writes_completed.fetch_add(1, Ordering::Relaxed);
        if overwrite {
            self.overwrites.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_peek_read(&self, enabled: bool) {
        if enabled {
            self.peek_reads.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_consume(&self, enabled: bool) {
        if enabled {
            self.consumes_completed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_slot_acq_timeout(&self, enabled: bool) {
        if enabled {
            self.slot_acq_timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_data_available_timeout(&self, enabled: bool) {
        if enabled {
            self.data_available_timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            writes_completed: self.writes_completed.load(Ordering::Relaxed),
            overwrites: self.overwrites.load(Ordering::Relaxed),
            peek_reads: self.peek_reads.load(Ordering::Relaxed),
            consumes_completed: self.consumes_completed.load(Ordering::Relaxed),
            slot_acq_timeouts: self.slot_acq_timeouts.load(Ordering::Relaxed),
            data_available_timeouts: self.data_available_timeouts.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of a buffer's [`Metrics`] counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub writes_completed: u64,
    pub overwrites: u64,
    pub peek_reads: u64,
    pub consumes_completed: u64,
    pub slot_acq_timeouts: u64,
    pub data_available_timeouts: u64,
}
