//! Error definitions for the co-simulation harness.
//!
//! Every check the harness performs returns a typed result; a failed check is one of the
//! `CosimError` variants below and is always fatal. This module provides:
//! 1. **Errors:** One variant per concrete divergence, carrying the cycle and the implicated
//!    instruction, address or register-file byte.
//! 2. **Categories:** The coarse failure taxonomy each variant belongs to.
//! 3. **Exit Status:** A distinct process status per category for scripted regressions.

use std::fmt;
use std::path::PathBuf;

use crate::common::trap::OracleFault;
use crate::config::ConfigError;

/// Coarse failure taxonomy of the harness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// A bus request references an address, size or data that no expected access matches.
    ProtocolViolation,
    /// An unrecorded register-file write changed the prior shadow value.
    CoverageViolation,
    /// Observed content diverges from what the reference model recorded.
    ConsistencyViolation,
    /// No load/store unit slot was allocated when one was required.
    CapacityExhaustion,
    /// The reference model raised an architectural trap.
    UnresolvedTrap,
    /// The cycle bound was exceeded.
    Timeout,
    /// The RTL issued a bus request of an unsupported kind.
    UnknownOperation,
    /// Internal bookkeeping collided (duplicate ids, out-of-order commit).
    InvariantViolation,
    /// Invalid configuration, or an image or waveform file that could not be opened.
    Setup,
}

impl Category {
    /// Process exit status reported for a run that failed with this category.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::ProtocolViolation => 2,
            Self::CoverageViolation => 3,
            Self::ConsistencyViolation => 4,
            Self::CapacityExhaustion => 5,
            Self::UnresolvedTrap => 6,
            Self::Timeout => 7,
            Self::UnknownOperation => 8,
            Self::InvariantViolation => 9,
            Self::Setup => 10,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ProtocolViolation => "protocol violation",
            Self::CoverageViolation => "coverage violation",
            Self::ConsistencyViolation => "consistency violation",
            Self::CapacityExhaustion => "capacity exhaustion",
            Self::UnresolvedTrap => "unresolved trap",
            Self::Timeout => "timeout",
            Self::UnknownOperation => "unknown operation",
            Self::InvariantViolation => "invariant violation",
            Self::Setup => "setup error",
        };
        f.write_str(name)
    }
}

/// Kind of expected access left outstanding when an event committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// Memory read keyed by address.
    MemRead,
    /// Memory write keyed by address.
    MemWrite,
    /// Register-file byte keyed by absolute byte index.
    VrfByte,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MemRead => f.write_str("mem read"),
            Self::MemWrite => f.write_str("mem write"),
            Self::VrfByte => f.write_str("vrf write"),
        }
    }
}

/// Fatal divergence or setup failure detected by the harness.
#[derive(Debug, thiserror::Error)]
pub enum CosimError {
    /// Bus read at an address the owning instruction never reads.
    #[error("[{cycle}] cannot find mem read of addr {addr:#010x} ({insn})")]
    UnexpectedRead {
        /// Cycle of detection.
        cycle: u64,
        /// Requested address.
        addr: u64,
        /// Owning instruction.
        insn: String,
    },

    /// Bus read whose size differs from the recorded read.
    #[error(
        "[{cycle}] expect mem read of size {expected}, actual size {actual} (addr={addr:#010x}, {insn})"
    )]
    ReadSizeMismatch {
        /// Cycle of detection.
        cycle: u64,
        /// Requested address.
        addr: u64,
        /// Recorded size in bytes.
        expected: u32,
        /// Requested size in bytes.
        actual: u32,
        /// Owning instruction.
        insn: String,
    },

    /// Bus write at an address the owning instruction never writes.
    #[error("[{cycle}] cannot find mem write of addr {addr:#010x} ({insn})")]
    UnexpectedWrite {
        /// Cycle of detection.
        cycle: u64,
        /// Requested address.
        addr: u64,
        /// Owning instruction.
        insn: String,
    },

    /// Bus write whose size differs from the recorded write.
    #[error(
        "[{cycle}] expect mem write of size {expected}, actual size {actual} (addr={addr:#010x}, {insn})"
    )]
    WriteSizeMismatch {
        /// Cycle of detection.
        cycle: u64,
        /// Requested address.
        addr: u64,
        /// Recorded size in bytes.
        expected: u32,
        /// Requested size in bytes.
        actual: u32,
        /// Owning instruction.
        insn: String,
    },

    /// Bus write whose data differs from the recorded write.
    #[error(
        "[{cycle}] expect mem write of data {expected:#x}, actual data {actual:#x} (addr={addr:#010x}, {insn})"
    )]
    WriteDataMismatch {
        /// Cycle of detection.
        cycle: u64,
        /// Requested address.
        addr: u64,
        /// Recorded data.
        expected: u64,
        /// Requested data.
        actual: u64,
        /// Owning instruction.
        insn: String,
    },

    /// Bus request whose source tag maps to no queued load/store.
    #[error("[{cycle}] cannot find event with lsu slot {slot} (channel={channel}, source={tag:#06x})")]
    UnknownSource {
        /// Cycle of detection.
        cycle: u64,
        /// Bus channel.
        channel: usize,
        /// Raw source tag.
        tag: u64,
        /// Slot the tag maps to.
        slot: u8,
    },

    /// Second request at an address that already has a transaction in flight.
    #[error("[{cycle}] request at addr {addr:#010x} already in flight on channel {channel}")]
    DuplicateInFlight {
        /// Cycle of detection.
        cycle: u64,
        /// Bus channel.
        channel: usize,
        /// Requested address.
        addr: u64,
    },

    /// A register-file byte nobody recorded was overwritten with a different value.
    #[error(
        "[{cycle}] vrf writes byte {written:#04x} at [{index}] (lane={lane}, vd={vd}, offset={offset}, original={original:#04x}), but not recorded by reference"
    )]
    UnrecordedWrite {
        /// Cycle of detection.
        cycle: u64,
        /// Absolute register-file byte index.
        index: usize,
        /// Writing lane.
        lane: u32,
        /// Destination register.
        vd: u32,
        /// Element offset.
        offset: u32,
        /// Byte written by the RTL.
        written: u8,
        /// Shadow value before the write.
        original: u8,
    },

    /// A recorded register-file byte was written with the wrong value.
    #[error(
        "[{cycle}] vrf byte [{index}] incorrect (lane={lane}, vd={vd}, offset={offset}): expect {expected:#04x}, actual {actual:#04x} ({insn})"
    )]
    VrfByteMismatch {
        /// Cycle of detection.
        cycle: u64,
        /// Absolute register-file byte index.
        index: usize,
        /// Writing lane.
        lane: u32,
        /// Destination register.
        vd: u32,
        /// Element offset.
        offset: u32,
        /// Byte recorded by the reference model.
        expected: u8,
        /// Byte written by the RTL.
        actual: u8,
        /// Owning instruction.
        insn: String,
    },

    /// A register-file write addressed a byte outside the register file.
    #[error("[{cycle}] vrf write at byte [{index}] is outside the {size}-byte register file")]
    VrfIndexOutOfRange {
        /// Cycle of detection.
        cycle: u64,
        /// Absolute register-file byte index.
        index: usize,
        /// Register-file size in bytes.
        size: usize,
    },

    /// The scalar result returned on commit differs from the reference.
    #[error("[{cycle}] expect rd value {expected:#x}, rtl responded {actual:#x} ({insn})")]
    RdMismatch {
        /// Cycle of detection.
        cycle: u64,
        /// Reference value.
        expected: u64,
        /// RTL response value.
        actual: u64,
        /// Committing instruction.
        insn: String,
    },

    /// An event committed with an expected access still outstanding.
    #[error("[{cycle}] expect {kind} at {location:#x}, not executed when commit ({insn})")]
    UnexecutedAccess {
        /// Cycle of detection.
        cycle: u64,
        /// Kind of access left outstanding.
        kind: AccessKind,
        /// Address or register-file byte index.
        location: u64,
        /// Committing instruction.
        insn: String,
    },

    /// An issued load/store found no allocated LSU slot.
    #[error("[{cycle}] load store issued but no lsu slot allocated ({insn})")]
    NoFreeLsuSlot {
        /// Cycle of detection.
        cycle: u64,
        /// Issued instruction.
        insn: String,
    },

    /// The reference model trapped.
    #[error(transparent)]
    UnresolvedTrap(#[from] OracleFault),

    /// The cycle bound was reached.
    #[error("[{cycle}] simulation timeout (bound {bound} cycles)")]
    Timeout {
        /// Cycle of detection.
        cycle: u64,
        /// Configured bound.
        bound: u64,
    },

    /// Bus request with an opcode the memory agent does not serve.
    #[error("[{cycle}] unknown tl opcode {opcode} on channel {channel}")]
    UnknownOperation {
        /// Cycle of detection.
        cycle: u64,
        /// Bus channel.
        channel: usize,
        /// Raw opcode.
        opcode: u64,
    },

    /// Internal bookkeeping collision.
    #[error("[{cycle}] invariant violated: {detail}")]
    InvariantViolation {
        /// Cycle of detection.
        cycle: u64,
        /// What collided.
        detail: String,
    },

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The waveform file could not be opened.
    #[error("cannot open waveform {}: {source}", path.display())]
    Trace {
        /// Waveform path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The program image could not be loaded.
    #[error("cannot load image {}: {source}", path.display())]
    Image {
        /// Image path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
}

impl CosimError {
    /// Failure category of this error.
    pub const fn category(&self) -> Category {
        match self {
            Self::UnexpectedRead { .. }
            | Self::ReadSizeMismatch { .. }
            | Self::UnexpectedWrite { .. }
            | Self::WriteSizeMismatch { .. }
            | Self::WriteDataMismatch { .. }
            | Self::UnknownSource { .. }
            | Self::DuplicateInFlight { .. } => Category::ProtocolViolation,
            Self::UnrecordedWrite { .. } => Category::CoverageViolation,
            Self::VrfByteMismatch { .. }
            | Self::VrfIndexOutOfRange { .. }
            | Self::RdMismatch { .. }
            | Self::UnexecutedAccess { .. } => Category::ConsistencyViolation,
            Self::NoFreeLsuSlot { .. } => Category::CapacityExhaustion,
            Self::UnresolvedTrap(_) => Category::UnresolvedTrap,
            Self::Timeout { .. } => Category::Timeout,
            Self::UnknownOperation { .. } => Category::UnknownOperation,
            Self::InvariantViolation { .. } => Category::InvariantViolation,
            Self::Config(_) | Self::Trace { .. } | Self::Image { .. } => Category::Setup,
        }
    }

    /// Process exit status for this error.
    pub const fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub(crate) fn invariant(cycle: u64, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            cycle,
            detail: detail.into(),
        }
    }
}
