//! Trap definitions for the reference model.
//!
//! The reference model raises a trap when an instruction it executes takes a synchronous
//! exception. The harness never resumes past a trap: the program under test is expected to
//! run trap-free, so a trap at an instruction boundary aborts the run.

use std::fmt;

/// RISC-V synchronous exception causes the reference model can report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Instruction address misaligned; carries the misaligned target.
    InstructionAddressMisaligned(u64),

    /// Instruction access fault; carries the faulting fetch address.
    InstructionAccessFault(u64),

    /// Illegal instruction; carries the instruction encoding.
    IllegalInstruction(u32),

    /// Breakpoint; carries the program counter.
    Breakpoint(u64),

    /// Load address misaligned; carries the misaligned address.
    LoadAddressMisaligned(u64),

    /// Load access fault; carries the faulting address.
    LoadAccessFault(u64),

    /// Store/AMO address misaligned; carries the misaligned address.
    StoreAddressMisaligned(u64),

    /// Store/AMO access fault; carries the faulting address.
    StoreAccessFault(u64),

    /// Environment call from machine mode.
    EnvironmentCallFromMMode,

    /// Any other cause, by its `mcause` exception code.
    Other(u64),
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionAddressMisaligned(addr) => {
                write!(f, "InstructionAddressMisaligned({addr:#x})")
            }
            Self::InstructionAccessFault(addr) => write!(f, "InstructionAccessFault({addr:#x})"),
            Self::IllegalInstruction(inst) => write!(f, "IllegalInstruction({inst:#010x})"),
            Self::Breakpoint(pc) => write!(f, "Breakpoint({pc:#x})"),
            Self::LoadAddressMisaligned(addr) => write!(f, "LoadAddressMisaligned({addr:#x})"),
            Self::LoadAccessFault(addr) => write!(f, "LoadAccessFault({addr:#x})"),
            Self::StoreAddressMisaligned(addr) => write!(f, "StoreAddressMisaligned({addr:#x})"),
            Self::StoreAccessFault(addr) => write!(f, "StoreAccessFault({addr:#x})"),
            Self::EnvironmentCallFromMMode => write!(f, "EnvironmentCallFromMMode"),
            Self::Other(code) => write!(f, "Exception({code})"),
        }
    }
}

impl std::error::Error for Trap {}

/// A trap raised by the reference model while stepping one instruction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("reference model trapped with {trap} at pc {pc:#010x}")]
pub struct OracleFault {
    /// Program counter of the trapping instruction.
    pub pc: u64,
    /// Exception cause.
    pub trap: Trap,
}

impl OracleFault {
    /// Creates a fault for the instruction at `pc`.
    pub const fn new(pc: u64, trap: Trap) -> Self {
        Self { pc, trap }
    }
}
