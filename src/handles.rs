use crate::buffer::MtCircularBuffer;
use parking_lot::{RwLockReadGuard, RwLockWriteGuard};
use std::ops::{Deref, DerefMut};

/// Exclusive write access to one slot, granted by
/// [`MtCircularBuffer::write_next`].
///
/// Dropping the handle (implicitly at scope exit, or explicitly via
/// `drop(handle)`) is the sole release point: it clears the writing flag,
/// marks the slot dirty, and — unless the slot was already dirty at
/// acquisition time (an overwrite) — enqueues the slot for consumption.
pub struct WriteHandle<'a, T> {
    buffer: &'a MtCircularBuffer<T>,
    slot: usize,
    guard: Option<RwLockWriteGuard<'a, T>>,
    overwrite: bool,
}

impl<'a, T> WriteHandle<'a, T> {
    pub(crate) fn new(
        buffer: &'a MtCircularBuffer<T>,
        slot: usize,
        guard: RwLockWriteGuard<'a, T>,
        overwrite: bool,
    ) -> Self {
        Self {
            buffer,
            slot,
            guard: Some(guard),
            overwrite,
        }
    }

    /// Index of the slot this handle writes to.
    #[must_use]
    pub fn slot_index(&self) -> usize {
        self.slot
    }

    /// `true` iff this slot's previous content had never been drained (i.e.
    /// this write overwrites an undrained value).
    #[must_use]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

impl<T> Deref for WriteHandle<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.guard.as_ref().expect("guard taken only on drop")
    }
}

impl<T> DerefMut for WriteHandle<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.guard.as_mut().expect("guard taken only on drop")
    }
}

impl<T> Drop for WriteHandle<'_, T> {
    fn drop(&mut self) {
        // Drop the per-slot lock before the release protocol takes the
        // global lock, so the two are never held at once (SPEC_FULL.md §9).
        self.guard.take();
        self.buffer.release_write(self.slot, self.overwrite);
    }
}

/// Shared, non-draining read access to one slot, granted by
/// [`MtCircularBuffer::read_slot`] or [`MtCircularBuffer::read_newest_available`].
///
/// Dropping the handle decrements the slot's reader count; the
/// drained-queue is untouched.
pub struct PeekReadHandle<'a, T> {
    buffer: &'a MtCircularBuffer<T>,
    slot: usize,
    guard: Option<RwLockReadGuard<'a, T>>,
}

impl<'a, T> PeekReadHandle<'a, T> {
    pub(crate) fn new(buffer: &'a MtCircularBuffer<T>, slot: usize, guard: RwLockReadGuard<'a, T>) -> Self {
        Self {
            buffer,
            slot,
            guard: Some(guard),
        }
    }

    /// Index of the slot this handle reads from.
    #[must_use]
    pub fn slot_index(&self) -> usize {
        self.slot
    }
}

impl<T> Deref for PeekReadHandle<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.guard.as_ref().expect("guard taken only on drop")
    }
}

impl<T> Drop for PeekReadHandle<'_, T> {
    fn drop(&mut self) {
        self.guard.take();
        self.buffer.release_peek_read(self.slot);
    }
}

/// Shared, draining read access to one slot, granted by
/// [`MtCircularBuffer::consume_next_available`].
///
/// The drained-queue entry is removed at acquisition time. Dropping the
/// handle clears the slot's dirty flag and decrements its reader count.
pub struct ConsumeHandle<'a, T> {
    buffer: &'a MtCircularBuffer<T>,
    slot: usize,
    guard: Option<RwLockReadGuard<'a, T>>,
}

impl<'a, T> ConsumeHandle<'a, T> {
    pub(crate) fn new(buffer: &'a MtCircularBuffer<T>, slot: usize, guard: RwLockReadGuard<'a, T>) -> Self {
        Self {
            buffer,
            slot,
            guard: Some(guard),
        }
    }

    /// Index of the slot this handle drains.
    #[must_use]
    pub fn slot_index(&self) -> usize {
        self.slot
    }
}

impl<T> Deref for ConsumeHandle<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.guard.as_ref().expect("guard taken only on drop")
    }
}

impl<T> Drop for ConsumeHandle<'_, T> {
    fn drop(&mut self) {
        self.guard.take();
        self.buffer.release_consume(self.slot);
    }
}
