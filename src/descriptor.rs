use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A single ring slot: the storage cell and its descriptor, fused together.
///
/// The per-slot reader/writer lock described in the spec *is*
/// `parking_lot::RwLock<T>` here rather than a separate lock guarding a raw
/// cell — acquiring the lock and obtaining access to the value are the same
/// operation, the idiomatic Rust shape for this kind of guarded cell.
/// `writing`/`n_reading`/`is_dirty` are the advisory descriptor flags from
/// the spec; they are tracked alongside the lock (not derived from it)
/// because the lock type itself does not expose a live reader count.
pub(crate) struct Slot<T> {
    cell: RwLock<T>,
    writing: AtomicBool,
    n_reading: AtomicUsize,
    is_dirty: AtomicBool,
}

impl<T> Slot<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            cell: RwLock::new(value),
            writing: AtomicBool::new(false),
            n_reading: AtomicUsize::new(0),
            is_dirty: AtomicBool::new(false),
        }
    }

    pub(crate) fn cell(&self) -> &RwLock<T> {
        &self.cell
    }

    pub(crate) fn is_writing(&self) -> bool {
        self.writing.load(Ordering::Acquire)
    }

    pub(crate) fn set_writing(&self, value: bool) {
        self.writing.store(value, Ordering::Release);
    }

    pub(crate) fn n_reading(&self) -> usize {
        self.n_reading.load(Ordering::Acquire)
    }

    pub(crate) fn incr_reading(&self) {
        self.n_reading.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn decr_reading(&self) {
        self.n_reading.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::Acquire)
    }

    pub(crate) fn set_dirty(&self, value: bool) {
        self.is_dirty.store(value, Ordering::Release);
    }
}
