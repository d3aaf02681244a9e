//! Lockstep co-simulation harness for a RISC-V vector unit.
//!
//! This crate runs a golden reference model and an RTL model of a vector unit side by side
//! and checks every memory transaction and register-file write the RTL performs. It provides:
//! 1. **ISA:** Bit-field classification of fetched instructions into tracked event classes.
//! 2. **Oracle:** The reference-model capability and the event extraction built on top of it.
//! 3. **Core:** Tracked events and the pending event queue that reorders them against the RTL.
//! 4. **DUT:** Structured signal identifiers and the signal-access and trace capabilities of the RTL model.
//! 5. **Bus:** The memory-side agent answering RTL load/store requests after a fixed latency.
//! 6. **VRF:** Register-file write verification against a shadow copy of the register file.
//! 7. **Simulation:** The lockstep driver that clocks the RTL and wires everything together.

/// Common types (errors, traps).
pub mod common;
/// Harness configuration (run parameters and fixed vector-unit knobs).
pub mod config;
/// Tracked events and the pending event queue.
pub mod core;
/// Signal-level capabilities of the RTL model under test.
pub mod dut;
/// Bus transaction emulator (memory agent for the RTL's load/store ports).
pub mod bus;
/// Instruction classification.
pub mod isa;
/// Reference model capability and event extraction.
pub mod oracle;
/// Lockstep driver.
pub mod sim;
/// Run statistics.
pub mod stats;
/// Register-file write verification.
pub mod vrf;

/// Crate-wide error type; every fatal check surfaces as one of its variants.
pub use crate::common::{Category, CosimError};
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Lockstep driver; construct with `Cosim::new` and call `run`.
pub use crate::sim::{Cosim, Outcome};
