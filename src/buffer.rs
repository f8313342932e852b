use crate::config::Config;
use crate::descriptor::Slot;
use crate::error::BufferError;
use crate::handles::{ConsumeHandle, PeekReadHandle, WriteHandle};
use crate::invariants::{
    debug_assert_cursor_in_bounds, debug_assert_queue_bounded, debug_assert_queued_slot_is_dirty,
    debug_assert_writer_reader_exclusive,
};
use crate::metrics::{Metrics, MetricsSnapshot};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Coarse global state: the write cursor and the drained-queue. Guarded by a
/// single `parking_lot::Mutex`, which also backs the availability `Condvar` —
/// this is the "pick one discipline" choice for the queue described in
/// SPEC_FULL.md §4.3.
struct GlobalState {
    cursor: usize,
    queue: VecDeque<usize>,
}

/// A multi-threaded circular buffer for single-producer / multiple-consumer
/// pipelines. See the crate-level docs for an overview.
pub struct MtCircularBuffer<T> {
    slots: Vec<Slot<T>>,
    global: Mutex<GlobalState>,
    available: Condvar,
    config: Config,
    metrics: Metrics,
}

impl<T> MtCircularBuffer<T>
where
    T: Default,
{
    /// Creates a buffer of `capacity` slots, each initialised to `T::default()`,
    /// using [`Config::default`] timeouts.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_config(Config {
            capacity,
            ..Config::default()
        })
    }

    /// Creates a buffer from an explicit [`Config`], with every slot
    /// initialised to `T::default()`.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        assert!(config.capacity > 0, "capacity must be at least 1");
        let slots = (0..config.capacity).map(|_| Slot::new(T::default())).collect();
        Self {
            slots,
            global: Mutex::new(GlobalState {
                cursor: 0,
                queue: VecDeque::with_capacity(config.capacity),
            }),
            available: Condvar::new(),
            config,
            metrics: Metrics::default(),
        }
    }
}

impl<T> MtCircularBuffer<T> {
    /// Creates a buffer by filling each slot from `init(index)`, using
    /// [`Config::default`] timeouts. Useful when `T` has no `Default` impl.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn from_fn(capacity: usize, init: impl FnMut(usize) -> T) -> Self {
        Self::from_fn_with_config(
            Config {
                capacity,
                ..Config::default()
            },
            init,
        )
    }

    /// Like [`Self::from_fn`] but with an explicit [`Config`].
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    #[must_use]
    pub fn from_fn_with_config(config: Config, mut init: impl FnMut(usize) -> T) -> Self {
        assert!(config.capacity > 0, "capacity must be at least 1");
        let slots = (0..config.capacity).map(|i| Slot::new(init(i))).collect();
        Self {
            slots,
            global: Mutex::new(GlobalState {
                cursor: 0,
                queue: VecDeque::with_capacity(config.capacity),
            }),
            available: Condvar::new(),
            config,
            metrics: Metrics::default(),
        }
    }

    /// Number of slots in the ring.
    #[must_use]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` iff slot `i` currently has an unreleased write handle.
    /// Returns `false` for an out-of-range index (advisory, non-panicking).
    #[must_use]
    pub fn is_written(&self, i: usize) -> bool {
        self.slots.get(i).is_some_and(Slot::is_writing)
    }

    /// Returns `true` iff slot `i` has at least one live read/consume handle.
    /// Returns `false` for an out-of-range index.
    #[must_use]
    pub fn is_read(&self, i: usize) -> bool {
        self.slots.get(i).is_some_and(|s| s.n_reading() > 0)
    }

    /// Number of live read/consume handles on slot `i`. Returns 0 for an
    /// out-of-range index.
    #[must_use]
    pub fn num_concurrent_read(&self, i: usize) -> usize {
        self.slots.get(i).map_or(0, Slot::n_reading)
    }

    /// Number of slots currently in the drained-queue (filled, not yet
    /// consumed).
    #[must_use]
    pub fn num_consumable_slots(&self) -> usize {
        self.global.lock().queue.len()
    }

    /// Snapshot of this buffer's metrics. Counters stay at zero if
    /// `Config::enable_metrics` was false at construction.
    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn deadline(&self, timeout: Duration) -> Instant {
        Instant::now() + timeout
    }

    fn remaining(deadline: Instant) -> Duration {
        deadline.saturating_duration_since(Instant::now())
    }

    /// Grants exclusive write access to the slot indicated by the current
    /// write cursor, using the configured default timeout.
    pub fn write_next(&self) -> Result<WriteHandle<'_, T>, BufferError> {
        self.write_next_timeout(self.config.lock_timeout)
    }

    /// Like [`Self::write_next`] but with an explicit timeout overriding
    /// [`Config::lock_timeout`] for this call.
    pub fn write_next_timeout(&self, timeout: Duration) -> Result<WriteHandle<'_, T>, BufferError> {
        let deadline = self.deadline(timeout);

        // Snapshot-and-advance the cursor in a single critical section
        // (SPEC_FULL.md §4.2/§9 option (b)): the global lock is taken once,
        // never together with a per-slot lock. This also means the cursor
        // only ever moves forward here, never contingent on a later slot-lock
        // acquisition succeeding.
        let idx = {
            let mut state = self
                .global
                .try_lock_for(Self::remaining(deadline))
                .ok_or(BufferError::SlotAcqTimeout)?;
            let idx = state.cursor;
            state.cursor = (idx + 1) % self.slots.len();
            debug_assert_cursor_in_bounds!(state.cursor, self.slots.len());
            idx
        };

        let slot = &self.slots[idx];
        let guard = slot
            .cell()
            .try_write_for(Self::remaining(deadline))
            .ok_or_else(|| {
                self.metrics.record_slot_acq_timeout(self.config.enable_metrics);
                BufferError::SlotAcqTimeout
            })?;

        // Only now, with the slot lock secured, does any per-slot state
        // change — so a timeout above leaves the buffer's observable state
        // unchanged apart from the cursor advance (SPEC_FULL.md §7).
        let overwrite = slot.is_dirty();
        slot.set_writing(true);
        debug_assert_writer_reader_exclusive!(idx, slot.is_writing(), slot.n_reading());

        Ok(WriteHandle::new(self, idx, guard, overwrite))
    }

    /// Grants shared read access to slot `i` without affecting its drained
    /// state, using the configured default timeout.
    ///
    /// # Panics
    ///
    /// Panics if `i >= size()`.
    pub fn read_slot(&self, i: usize) -> Result<PeekReadHandle<'_, T>, BufferError> {
        self.read_slot_timeout(i, self.config.lock_timeout)
    }

    /// Like [`Self::read_slot`] but with an explicit timeout.
    ///
    /// # Panics
    ///
    /// Panics if `i >= size()`.
    pub fn read_slot_timeout(
        &self,
        i: usize,
        timeout: Duration,
    ) -> Result<PeekReadHandle<'_, T>, BufferError> {
        let slot = &self.slots[i];
        let guard = slot.cell().try_read_for(timeout).ok_or_else(|| {
            self.metrics.record_slot_acq_timeout(self.config.enable_metrics);
            BufferError::SlotAcqTimeout
        })?;
        slot.incr_reading();
        debug_assert_writer_reader_exclusive!(i, slot.is_writing(), slot.n_reading());
        self.metrics.record_peek_read(self.config.enable_metrics);
        Ok(PeekReadHandle::new(self, i, guard))
    }

    /// Grants shared read access to the most recently filled slot (the back
    /// of the drained-queue) without removing it, using the configured
    /// default timeout.
    pub fn read_newest_available(&self) -> Result<PeekReadHandle<'_, T>, BufferError> {
        self.read_newest_available_timeout(self.config.lock_timeout)
    }

    /// Like [`Self::read_newest_available`] but with an explicit timeout.
    pub fn read_newest_available_timeout(
        &self,
        timeout: Duration,
    ) -> Result<PeekReadHandle<'_, T>, BufferError> {
        let deadline = self.deadline(timeout);
        let idx = self.wait_for_available(deadline, |queue| queue.back().copied())?;

        let slot = &self.slots[idx];
        let guard = slot
            .cell()
            .try_read_for(Self::remaining(deadline))
            .ok_or_else(|| {
                self.metrics.record_slot_acq_timeout(self.config.enable_metrics);
                BufferError::SlotAcqTimeout
            })?;
        slot.incr_reading();
        self.metrics.record_peek_read(self.config.enable_metrics);
        Ok(PeekReadHandle::new(self, idx, guard))
    }

    /// Grants shared read access to the least recently filled slot (the
    /// front of the drained-queue) and removes it from the queue, using the
    /// configured default timeout.
    pub fn consume_next_available(&self) -> Result<ConsumeHandle<'_, T>, BufferError> {
        self.consume_next_available_timeout(self.config.lock_timeout)
    }

    /// Like [`Self::consume_next_available`] but with an explicit timeout.
    pub fn consume_next_available_timeout(
        &self,
        timeout: Duration,
    ) -> Result<ConsumeHandle<'_, T>, BufferError> {
        let deadline = self.deadline(timeout);
        let mut guard = self
            .global
            .try_lock_for(Self::remaining(deadline))
            .ok_or(BufferError::SlotAcqTimeout)?;

        loop {
            if let Some(&idx) = guard.queue.front() {
                let slot = &self.slots[idx];
                let remaining = Self::remaining(deadline);
                match slot.cell().try_read_for(remaining) {
                    Some(slot_guard) => {
                        guard.queue.pop_front();
                        drop(guard);
                        slot.incr_reading();
                        self.metrics.record_consume(self.config.enable_metrics);
                        return Ok(ConsumeHandle::new(self, idx, slot_guard));
                    }
                    None => {
                        // Slot-lock failure: re-broadcast so other waiters
                        // may retry against this same entry (SPEC_FULL.md §4.4/§7).
                        drop(guard);
                        self.available.notify_all();
                        self.metrics.record_slot_acq_timeout(self.config.enable_metrics);
                        return Err(BufferError::SlotAcqTimeout);
                    }
                }
            }

            let remaining = Self::remaining(deadline);
            if remaining.is_zero() {
                self.metrics
                    .record_data_available_timeout(self.config.enable_metrics);
                return Err(BufferError::DataAvailableTimeout);
            }
            let result = self.available.wait_for(&mut guard, remaining);
            if result.timed_out() && guard.queue.is_empty() {
                self.metrics
                    .record_data_available_timeout(self.config.enable_metrics);
                return Err(BufferError::DataAvailableTimeout);
            }
        }
    }

    /// Waits until the drained-queue is non-empty, then runs `pick` against
    /// it under the global lock and returns the picked index. Used by
    /// `read_newest_available`, which (unlike `consume_next_available`)
    /// never mutates the queue.
    fn wait_for_available(
        &self,
        deadline: Instant,
        pick: impl Fn(&VecDeque<usize>) -> Option<usize>,
    ) -> Result<usize, BufferError> {
        let mut guard = self
            .global
            .try_lock_for(Self::remaining(deadline))
            .ok_or(BufferError::SlotAcqTimeout)?;

        loop {
            if let Some(idx) = pick(&guard.queue) {
                return Ok(idx);
            }
            let remaining = Self::remaining(deadline);
            if remaining.is_zero() {
                self.metrics
                    .record_data_available_timeout(self.config.enable_metrics);
                return Err(BufferError::DataAvailableTimeout);
            }
            let result = self.available.wait_for(&mut guard, remaining);
            if result.timed_out() && guard.queue.is_empty() {
                self.metrics
                    .record_data_available_timeout(self.config.enable_metrics);
                return Err(BufferError::DataAvailableTimeout);
            }
        }
    }

    /// Empties the drained-queue and resets the write cursor to 0.
    ///
    /// Documented precondition: no other thread is concurrently accessing
    /// the buffer. Behaviour is undefined (in the "not memory-unsafe, but
    /// logically inconsistent" sense) if a writer or reader holds a per-slot
    /// lock while this runs.
    pub fn clear(&self) -> Result<(), BufferError> {
        self.clear_timeout(self.config.lock_timeout)
    }

    /// Like [`Self::clear`] but with an explicit timeout.
    pub fn clear_timeout(&self, timeout: Duration) -> Result<(), BufferError> {
        let mut state = self.global.try_lock_for(timeout).ok_or(BufferError::SlotAcqTimeout)?;
        state.queue.clear();
        state.cursor = 0;
        Ok(())
    }

    pub(crate) fn release_write(&self, slot_idx: usize, was_dirty: bool) {
        let slot = &self.slots[slot_idx];
        slot.set_writing(false);
        slot.set_dirty(true);
        debug_assert_queued_slot_is_dirty!(slot_idx, slot.is_dirty());

        if !was_dirty {
            let mut state = self.global.lock();
            state.queue.push_back(slot_idx);
            debug_assert_queue_bounded!(state.queue.len(), self.slots.len());
        }
        self.metrics.record_write(self.config.enable_metrics, was_dirty);
        self.available.notify_one();
    }

    pub(crate) fn release_peek_read(&self, slot_idx: usize) {
        self.slots[slot_idx].decr_reading();
    }

    pub(crate) fn release_consume(&self, slot_idx: usize) {
        let slot = &self.slots[slot_idx];
        slot.set_dirty(false);
        slot.decr_reading();
    }
}

impl<T> fmt::Display for MtCircularBuffer<T> {
    /// Single-line rendering, one character-triple per slot in order,
    /// wrapped in `"[ "` / `" ]"`. See SPEC_FULL.md §6 for the exact triple
    /// encoding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Snapshot under the global lock, matching the spec's classification
        // of a full-buffer read as one of the global lock's responsibilities.
        let _snapshot_guard = self.global.lock();

        write!(f, "[ ")?;
        for slot in &self.slots {
            let n_reading = slot.n_reading();
            if slot.is_writing() {
                write!(f, " W ")?;
            } else if n_reading > 0 {
                write!(f, "{n_reading}R ")?;
            } else if slot.is_dirty() {
                write!(f, " X ")?;
            } else {
                write!(f, " . ")?;
            }
        }
        write!(f, " ]")
    }
}

// MtCircularBuffer<T> is Send + Sync exactly when its fields are: the only
// interior mutability is behind `parking_lot::RwLock<T>` (per slot) and the
// global `Mutex`, both of which already require T: Send + Sync to make
// shared references across threads sound. No manual unsafe impl is needed —
// unlike a hand-rolled `UnsafeCell`-based ring, the auto traits here are
// already correct.
