//! Tracked events and the queue that reorders them against the RTL.

/// Tracked event records.
pub mod event;

/// Pending event queue.
pub mod queue;

pub use event::{
    EventKind, ExpectedWrites, IssueState, MemRecord, ScalarWrite, TrackedEvent, VectorCsrs,
    VrfRecord,
};
pub use queue::PendingQueue;
