//! Debug assertion macros for the data-model invariants documented in
//! `SPEC_FULL.md` §3. These are only active in debug builds
//! (`#[cfg(debug_assertions)]`), so there is zero overhead in release builds.

// =============================================================================
// INV-1: Writer/reader exclusion
// =============================================================================

/// Assert that a slot is never simultaneously written and read.
///
/// **Invariant**: `writing[i] ⟹ n_reading[i] == 0` and `n_reading[i] > 0 ⟹ !writing[i]`.
///
/// Used in: slot lock acquisition paths, after the flag transition.
macro_rules! debug_assert_writer_reader_exclusive {
    ($slot:expr, $writing:expr, $n_reading:expr) => {
        debug_assert!(
            !($writing && $n_reading > 0),
            "INV-1 violated on slot {}: writing={} n_reading={}",
            $slot,
            $writing,
            $n_reading
        )
    };
}

// =============================================================================
// INV-2: Drained-queue membership implies dirty
// =============================================================================

/// Assert that a slot pushed onto the drained-queue is actually dirty.
///
/// **Invariant**: `∀ i ∈ drained-queue: is_dirty[i]`.
///
/// Used in: write-handle release, just before pushing onto the queue.
macro_rules! debug_assert_queued_slot_is_dirty {
    ($slot:expr, $is_dirty:expr) => {
        debug_assert!(
            $is_dirty,
            "INV-2 violated: slot {} queued as drained-pending but is_dirty is false",
            $slot
        )
    };
}

// =============================================================================
// INV-3: Cursor bounds
// =============================================================================

/// Assert that the write cursor stays within `[0, capacity)`.
///
/// Used in: cursor advance, after computing the next value.
macro_rules! debug_assert_cursor_in_bounds {
    ($cursor:expr, $capacity:expr) => {
        debug_assert!(
            $cursor < $capacity,
            "INV-3 violated: cursor {} out of bounds for capacity {}",
            $cursor,
            $capacity
        )
    };
}

// =============================================================================
// INV-queue-bound: Drained-queue never exceeds capacity
// =============================================================================

/// Assert that the drained-queue never holds more entries than there are slots.
///
/// Used in: write-handle release, after pushing onto the queue.
macro_rules! debug_assert_queue_bounded {
    ($len:expr, $capacity:expr) => {
        debug_assert!(
            $len <= $capacity,
            "drained-queue length {} exceeds capacity {}",
            $len,
            $capacity
        )
    };
}

pub(crate) use debug_assert_cursor_in_bounds;
pub(crate) use debug_assert_queue_bounded;
pub(crate) use debug_assert_queued_slot_is_dirty;
pub(crate) use debug_assert_writer_reader_exclusive;
