//! Loom-based model test of the producer/consumer lock ordering.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! `parking_lot`'s guards aren't instrumented by loom, so — following the
//! teacher crate's own `loom_tests.rs` convention — this test models the
//! protocol in isolation with loom's own primitives rather than exercising
//! `MtCircularBuffer` directly. What's under test is the invariant from
//! SPEC_FULL.md §9: the producer path (`write_next`'s cursor advance, then
//! the write-handle release on drop) never holds the per-slot lock and the
//! global lock at the same time, while `consume_next_available` holds the
//! global lock across its attempt on the per-slot lock (global, then slot).
//! Since the producer never holds both at once, there is no second ordering
//! for the consumer's global-then-slot order to cycle against.

#![cfg(feature = "loom")]

use loom::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use loom::sync::{Condvar, Mutex};
use loom::thread;
use std::collections::VecDeque;

struct Model {
    // Per-slot: "is the slot write-locked".
    slot_locked: AtomicBool,
    is_dirty: AtomicBool,
    n_reading: AtomicUsize,
    global: Mutex<VecDeque<usize>>,
    available: Condvar,
}

impl Model {
    fn new() -> Self {
        Self {
            slot_locked: AtomicBool::new(false),
            is_dirty: AtomicBool::new(false),
            n_reading: AtomicUsize::new(0),
            global: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Producer side: mirrors `write_next` (cursor advance under the global
    /// lock, released before the slot lock is attempted) immediately
    /// followed by `WriteHandle::drop`'s release protocol (slot lock
    /// dropped before the global lock is retaken to enqueue). The global
    /// lock and the slot lock are never held simultaneously here.
    fn produce(&self) {
        // write_next: snapshot-and-advance the cursor in one critical
        // section, then release the global lock entirely.
        {
            let _queue = self.global.lock().unwrap();
        }

        self.slot_locked.store(true, Ordering::AcqRel);
        let was_dirty = self.is_dirty.swap(true, Ordering::AcqRel);
        self.slot_locked.store(false, Ordering::Release);

        // WriteHandle::drop: slot lock already released above, so this
        // global acquisition never overlaps it.
        if !was_dirty {
            let mut queue = self.global.lock().unwrap();
            queue.push_back(0);
        }
        self.available.notify_one();
    }

    /// Consumer side: hold the global lock, attempt the slot lock — mirrors
    /// `consume_next_available`. Never the reverse order.
    fn consume(&self) -> bool {
        let mut queue = self.global.lock().unwrap();
        if queue.front().is_none() {
            return false;
        }
        if self
            .slot_locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            queue.pop_front();
            drop(queue);
            self.n_reading.fetch_add(1, Ordering::AcqRel);
            self.is_dirty.store(false, Ordering::Release);
            self.n_reading.fetch_sub(1, Ordering::AcqRel);
            self.slot_locked.store(false, Ordering::Release);
            true
        } else {
            false
        }
    }
}

#[test]
fn producer_and_consumer_never_deadlock() {
    loom::model(|| {
        let model = loom::sync::Arc::new(Model::new());

        let producer = {
            let model = model.clone();
            thread::spawn(move || model.produce())
        };
        let consumer = {
            let model = model.clone();
            thread::spawn(move || {
                model.consume();
            })
        };

        producer.join().unwrap();
        consumer.join().unwrap();
    });
}
