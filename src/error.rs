use thiserror::Error;

/// Error types for buffer access operations.
///
/// Both variants signal a transient timeout; neither leaves the buffer in a
/// partially-mutated state. Callers should treat either as a backpressure
/// signal: retry later, skip, or escalate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A per-slot lock (exclusive or shared) or the global coarse lock was
    /// not acquired within the deadline.
    #[error("timed out acquiring a slot lock")]
    SlotAcqTimeout,
    /// The drained-queue remained empty for the entire wait deadline.
    #[error("timed out waiting for data to become available")]
    DataAvailableTimeout,
}
