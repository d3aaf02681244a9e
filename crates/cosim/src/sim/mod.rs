//! Lockstep driver.
//!
//! Owns every piece of mutable harness state and runs the fill/drain loop. It provides:
//! 1. **Reset:** Drives the RTL through its reset sequence.
//! 2. **Fill:** Steps the oracle until the pending queue is full or a batch boundary is hit.
//! 3. **Drain:** Clocks the RTL, issuing the oldest unissued event, until the queue needs refilling.
//! 4. **Cycle:** The fixed per-cycle sequence of issue, bus, write sampling and commit.

/// `Cosim` and the fill/drain loop.
pub mod cosim;

/// Per-cycle sequence.
mod cycle;

pub use cosim::{Cosim, Outcome};
