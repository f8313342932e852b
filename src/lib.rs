//! MtCircularBuffer - a multi-threaded circular buffer for single-producer /
//! multiple-consumer pipelines.
//!
//! A fixed-capacity ring of N slots holds values of a parametric element type
//! `T`. A single producer thread acquires exclusive write access to the next
//! slot via [`MtCircularBuffer::write_next`]; any number of consumer threads
//! acquire shared read access to filled slots, either destructively via
//! [`MtCircularBuffer::consume_next_available`] (FIFO, drains the slot) or
//! non-destructively via [`MtCircularBuffer::read_slot`] /
//! [`MtCircularBuffer::read_newest_available`] (peeks, never drains).
//!
//! The buffer is not lock-free: every access is a bounded wait against a
//! per-slot `RwLock` plus a coarse global lock guarding the write cursor and
//! the drained-queue. A blocked access that exceeds its deadline returns
//! [`BufferError`] rather than blocking forever.
//!
//! # Example
//!
//! ```
//! use mt_circular_buffer::MtCircularBuffer;
//!
//! let buff = MtCircularBuffer::<i32>::new(3);
//!
//! for v in [10, 20, 30] {
//!     let mut wa = buff.write_next().unwrap();
//!     *wa = v;
//!     drop(wa); // release: slot becomes dirty, queued for consumption
//! }
//!
//! for expected in [10, 20, 30] {
//!     let ca = buff.consume_next_available().unwrap();
//!     assert_eq!(*ca, expected);
//! }
//! assert_eq!(buff.num_consumable_slots(), 0);
//! ```

mod buffer;
mod config;
mod descriptor;
mod error;
mod handles;
mod invariants;
mod metrics;

pub use buffer::MtCircularBuffer;
pub use config::Config;
pub use error::BufferError;
pub use handles::{ConsumeHandle, PeekReadHandle, WriteHandle};
pub use metrics::MetricsSnapshot;
