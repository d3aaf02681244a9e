//! Tracked events.
//!
//! A `TrackedEvent` records everything the reference model says one instruction will make
//! visible on the RTL's ports: the memory accesses it performs, the register-file bytes it
//! changes and its scalar result. The event stays queued until the RTL commits the
//! instruction, and each expected record is ticked off as the matching RTL activity is seen.

use std::collections::BTreeMap;
use std::fmt;

use crate::common::AccessKind;
use crate::isa::InsnClass;

/// Kind of tracked instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Vector load.
    Load,
    /// Vector store.
    Store,
    /// Vector arithmetic or configuration.
    VectorOp,
    /// Vector instruction with a scalar result; all earlier events must commit before later
    /// ones issue.
    FenceMarker,
    /// End of program.
    ExitMarker,
}

impl EventKind {
    /// Maps an instruction class to the event it produces, if any.
    ///
    /// A vector instruction with a scalar result is a fence marker. A CSR write produces an
    /// exit marker only when it targets `exit_csr`.
    pub const fn from_class(class: InsnClass, exit_csr: u32) -> Option<Self> {
        match class {
            InsnClass::Load => Some(Self::Load),
            InsnClass::Store => Some(Self::Store),
            InsnClass::Vector { .. } if class.is_vector_fence() => Some(Self::FenceMarker),
            InsnClass::Vector { .. } => Some(Self::VectorOp),
            InsnClass::CsrWrite { csr } if csr == exit_csr => Some(Self::ExitMarker),
            InsnClass::CsrWrite { .. } | InsnClass::Other => None,
        }
    }

    /// True for loads and stores, the events that own an LSU slot.
    pub const fn is_mem(self) -> bool {
        matches!(self, Self::Load | Self::Store)
    }

    /// True for fence and exit markers, which are never issued to the RTL.
    pub const fn is_marker(self) -> bool {
        matches!(self, Self::FenceMarker | Self::ExitMarker)
    }
}

/// Lifecycle of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IssueState {
    /// Queued, not yet accepted by the RTL.
    #[default]
    Pending,
    /// Accepted by the RTL, waiting for its commit response.
    Issued,
    /// Committed and removed from the queue.
    Committed,
}

/// Expected memory access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemRecord {
    /// Access size in bytes.
    pub size: u32,
    /// Value read or written.
    pub value: u64,
    /// Set once the RTL performed the access.
    pub executed: bool,
}

impl MemRecord {
    /// Creates an unexecuted record.
    pub const fn new(size: u32, value: u64) -> Self {
        Self {
            size,
            value,
            executed: false,
        }
    }
}

/// Expected register-file byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VrfRecord {
    /// Byte value after the instruction.
    pub byte: u8,
    /// Set once the RTL wrote this exact byte.
    pub matched: bool,
}

/// Expected writes, split by destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectedWrites {
    /// Memory writes keyed by address.
    pub mem: BTreeMap<u64, MemRecord>,
    /// Register-file bytes keyed by absolute byte index.
    pub vrf: BTreeMap<usize, VrfRecord>,
}

/// Vector CSR context presented alongside the instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VectorCsrs {
    /// Vector length.
    pub vl: u64,
    /// Start element.
    pub vstart: u64,
    /// Raw `vtype` (SEW, LMUL, tail/mask policy).
    pub vtype: u64,
    /// Fixed-point rounding mode.
    pub vxrm: u64,
}

/// Scalar destination write produced by the instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScalarWrite {
    /// Destination register index.
    pub rd: u32,
    /// Value written.
    pub value: u64,
}

/// Expected RTL-visible effects of one instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedEvent {
    /// Position in reference-model program order; assigned when queued.
    pub seq: u64,
    /// Program counter.
    pub pc: u64,
    /// Raw encoding.
    pub inst: u32,
    /// Event kind.
    pub kind: EventKind,
    /// Lifecycle state.
    pub state: IssueState,
    /// RTL instruction index, stamped once on issue.
    pub issue_idx: Option<u32>,
    /// LSU slot, assigned once for loads and stores.
    pub lsu_slot: Option<u8>,
    /// Value of `rs1` when the instruction executed.
    pub rs1: u64,
    /// Value of `rs2` when the instruction executed.
    pub rs2: u64,
    /// Vector CSR context.
    pub csrs: VectorCsrs,
    /// Expected memory reads keyed by address.
    pub reads: BTreeMap<u64, MemRecord>,
    /// Expected memory and register-file writes.
    pub writes: ExpectedWrites,
    /// Expected scalar result.
    pub rd_write: Option<ScalarWrite>,
    /// Scalar result reported by the RTL on commit.
    pub rtl_rd: Option<u64>,
}

impl TrackedEvent {
    /// Creates an event with no expected effects.
    pub fn new(pc: u64, inst: u32, kind: EventKind) -> Self {
        Self {
            seq: 0,
            pc,
            inst,
            kind,
            state: IssueState::Pending,
            issue_idx: None,
            lsu_slot: None,
            rs1: 0,
            rs2: 0,
            csrs: VectorCsrs::default(),
            reads: BTreeMap::new(),
            writes: ExpectedWrites::default(),
            rd_write: None,
            rtl_rd: None,
        }
    }

    /// Adds an expected memory read.
    #[must_use]
    pub fn with_read(mut self, addr: u64, size: u32, value: u64) -> Self {
        let _ = self.reads.insert(addr, MemRecord::new(size, value));
        self
    }

    /// Adds an expected memory write.
    #[must_use]
    pub fn with_write(mut self, addr: u64, size: u32, value: u64) -> Self {
        let _ = self.writes.mem.insert(addr, MemRecord::new(size, value));
        self
    }

    /// Adds expected register-file bytes starting at absolute byte index `base`.
    #[must_use]
    pub fn with_vrf_bytes(mut self, base: usize, bytes: &[u8]) -> Self {
        for (i, &byte) in bytes.iter().enumerate() {
            let _ = self.writes.vrf.insert(
                base + i,
                VrfRecord {
                    byte,
                    matched: false,
                },
            );
        }
        self
    }

    /// Sets the source operands presented on issue.
    #[must_use]
    pub fn with_operands(mut self, rs1: u64, rs2: u64) -> Self {
        self.rs1 = rs1;
        self.rs2 = rs2;
        self
    }

    /// Sets the vector CSR context presented on issue.
    #[must_use]
    pub fn with_csrs(mut self, csrs: VectorCsrs) -> Self {
        self.csrs = csrs;
        self
    }

    /// Sets the expected scalar result.
    #[must_use]
    pub fn with_rd(mut self, rd: u32, value: u64) -> Self {
        self.rd_write = Some(ScalarWrite { rd, value });
        self
    }

    /// True once the RTL accepted the instruction.
    pub fn is_issued(&self) -> bool {
        self.state == IssueState::Issued
    }

    /// True while any expected memory access is still unexecuted.
    pub fn has_pending_mem(&self) -> bool {
        self.reads.values().any(|r| !r.executed) || self.writes.mem.values().any(|w| !w.executed)
    }

    /// First expected access not yet observed, in read, write, register-file order.
    pub fn first_outstanding(&self) -> Option<(AccessKind, u64)> {
        if let Some((&addr, _)) = self.reads.iter().find(|(_, r)| !r.executed) {
            return Some((AccessKind::MemRead, addr));
        }
        if let Some((&addr, _)) = self.writes.mem.iter().find(|(_, w)| !w.executed) {
            return Some((AccessKind::MemWrite, addr));
        }
        self.writes
            .vrf
            .iter()
            .find(|(_, v)| !v.matched)
            .map(|(&index, _)| (AccessKind::VrfByte, index as u64))
    }

    /// Short description used in every diagnostic.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TrackedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} pc={:#010x} inst={:#010x} {:?}",
            self.seq, self.pc, self.inst, self.kind
        )?;
        if let Some(idx) = self.issue_idx {
            write!(f, " idx={idx}")?;
        }
        if let Some(slot) = self.lsu_slot {
            write!(f, " lsu={slot}")?;
        }
        Ok(())
    }
}
