//! Reference side of the lockstep.
//!
//! The driver only ever sees an `Oracle`: something that executes one instruction per step
//! and reports the RTL-visible effects of the interesting ones. This module provides:
//! 1. **Oracle:** The capability the driver consumes.
//! 2. **ReferenceModel:** The narrower capability an instruction-set simulator exposes.
//! 3. **Extraction:** `ExtractingOracle`, which turns a `ReferenceModel` into an `Oracle`.

/// Event extraction on top of a reference model.
pub mod extract;

use std::io;
use std::path::Path;

use crate::common::{OracleFault, Trap};
use crate::core::{TrackedEvent, VectorCsrs};

pub use extract::ExtractingOracle;

/// Golden instruction stream.
pub trait Oracle {
    /// Returns the architectural state to reset.
    fn reset(&mut self);

    /// Loads a program image and points execution at `entry`.
    ///
    /// # Errors
    ///
    /// Returns the I/O failure that prevented loading the image.
    fn load_image(&mut self, path: &Path, entry: u64) -> io::Result<()>;

    /// Executes exactly one instruction.
    ///
    /// Returns the tracked event for instructions with RTL-visible effects and `None` for
    /// everything else.
    ///
    /// # Errors
    ///
    /// Returns an `OracleFault` if fetching or executing the instruction traps.
    fn step(&mut self) -> Result<Option<TrackedEvent>, OracleFault>;
}

/// One memory access reported by the reference model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemAccess {
    /// Byte address.
    pub addr: u64,
    /// Size in bytes.
    pub size: u32,
    /// Value read or written.
    pub value: u64,
}

impl MemAccess {
    /// Creates an access record.
    pub const fn new(addr: u64, size: u32, value: u64) -> Self {
        Self { addr, size, value }
    }
}

/// Effects of one executed instruction, as reported by the reference model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommitLog {
    /// Memory reads, in program order.
    pub mem_reads: Vec<MemAccess>,
    /// Memory writes, in program order.
    pub mem_writes: Vec<MemAccess>,
    /// Scalar register write as `(rd, value)`.
    pub xreg_write: Option<(u32, u64)>,
}

/// Instruction-set simulator driven one instruction at a time.
pub trait ReferenceModel {
    /// Resets architectural state.
    fn reset(&mut self);

    /// Loads a program image and sets the program counter to `entry`.
    ///
    /// # Errors
    ///
    /// Returns the I/O failure that prevented loading the image.
    fn load_image(&mut self, path: &Path, entry: u64) -> io::Result<()>;

    /// Current program counter.
    fn pc(&self) -> u64;

    /// Fetches the instruction at the program counter without executing it.
    ///
    /// # Errors
    ///
    /// Returns the fetch trap, typically an instruction access fault.
    fn fetch(&mut self) -> Result<u32, Trap>;

    /// Scalar register `index`.
    fn xreg(&self, index: u32) -> u64;

    /// Current vector CSR context.
    fn vector_csrs(&self) -> VectorCsrs;

    /// Whole vector register file, register-major, little-endian within a register.
    fn vrf(&self) -> &[u8];

    /// Executes `inst` and advances the program counter.
    ///
    /// # Errors
    ///
    /// Returns the trap the instruction raised; architectural state is then unspecified.
    fn execute(&mut self, inst: u32) -> Result<CommitLog, Trap>;
}
