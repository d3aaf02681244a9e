//! Signal-level capabilities of the RTL model under test.
//!
//! The harness never links against a particular simulator. It talks to the RTL through two
//! narrow traits. This module provides:
//! 1. **Identifiers:** `Signal`, a structured name for every signal the harness reads or drives.
//! 2. **Access:** `SignalBus`, integer get/set on those signals plus combinational evaluation.
//! 3. **Tracing:** `TraceSink`, an optional receiver of per-half-cycle waveform snapshots.

use std::fmt;
use std::io;
use std::path::Path;

/// Fields of one memory channel (TileLink-UL A and D channels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TlField {
    /// Request valid (RTL → harness).
    AValid,
    /// Request opcode.
    AOpcode,
    /// Request address.
    AAddress,
    /// Request size, log2 bytes.
    ASize,
    /// Request source tag.
    ASource,
    /// Request data (writes).
    AData,
    /// Request ready (harness → RTL).
    AReady,
    /// Response valid (harness → RTL).
    DValid,
    /// Response opcode.
    DOpcode,
    /// Response size, log2 bytes.
    DSize,
    /// Response source tag.
    DSource,
    /// Response data (reads).
    DData,
    /// Response ready (RTL → harness).
    DReady,
}

impl TlField {
    const fn name(self) -> &'static str {
        match self {
            Self::AValid => "a_valid",
            Self::AOpcode => "a_bits_opcode",
            Self::AAddress => "a_bits_address",
            Self::ASize => "a_bits_size",
            Self::ASource => "a_bits_source",
            Self::AData => "a_bits_data",
            Self::AReady => "a_ready",
            Self::DValid => "d_valid",
            Self::DOpcode => "d_bits_opcode",
            Self::DSize => "d_bits_size",
            Self::DSource => "d_bits_source",
            Self::DData => "d_bits_data",
            Self::DReady => "d_ready",
        }
    }
}

/// Fields of the instruction issue handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueField {
    /// Issue request valid (harness → RTL).
    ReqValid,
    /// Issue request ready (RTL → harness).
    ReqReady,
    /// Instruction bits.
    Inst,
    /// Scalar operand `rs1`.
    Src1,
    /// Scalar operand `rs2`.
    Src2,
    /// CSR context: `vl`.
    Vl,
    /// CSR context: `vstart`.
    Vstart,
    /// CSR context: `vtype`.
    Vtype,
    /// CSR context: `vxrm`.
    Vxrm,
    /// Commit response valid (RTL → harness).
    RespValid,
    /// Commit response scalar data.
    RespData,
}

impl IssueField {
    const fn name(self) -> &'static str {
        match self {
            Self::ReqValid => "req_valid",
            Self::ReqReady => "req_ready",
            Self::Inst => "req_bits_inst",
            Self::Src1 => "req_bits_src1Data",
            Self::Src2 => "req_bits_src2Data",
            Self::Vl => "csrInterface_vl",
            Self::Vstart => "csrInterface_vStart",
            Self::Vtype => "csrInterface_vtype",
            Self::Vxrm => "csrInterface_vxrm",
            Self::RespValid => "resp_valid",
            Self::RespData => "resp_bits_data",
        }
    }
}

/// Fields of a register-file write port (lane port or write-queue enqueue port).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VrfWriteField {
    /// Write valid.
    Valid,
    /// Destination register.
    Vd,
    /// Element offset within the lane's share of the register.
    Offset,
    /// 4-bit byte mask.
    Mask,
    /// 32-bit data word.
    Data,
    /// Issue index of the writing instruction.
    InstIndex,
    /// One-hot destination lane (write-queue ports only).
    TargetLane,
}

impl VrfWriteField {
    const fn name(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Vd => "vd",
            Self::Offset => "offset",
            Self::Mask => "mask",
            Self::Data => "data",
            Self::InstIndex => "instIndex",
            Self::TargetLane => "targetLane",
        }
    }
}

/// Structured identifier of an RTL signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Clock.
    Clock,
    /// Synchronous reset.
    Reset,
    /// Memory channel field.
    Tl {
        /// Channel index.
        channel: usize,
        /// Field.
        field: TlField,
    },
    /// Issue handshake field.
    Issue(IssueField),
    /// Direct register-file write port of a lane.
    LaneWrite {
        /// Lane index.
        lane: usize,
        /// Field.
        field: VrfWriteField,
    },
    /// Enqueue port of an LSU slot's deferred write queue.
    WriteQueue {
        /// LSU slot.
        slot: usize,
        /// Field.
        field: VrfWriteField,
    },
    /// Pulses when the LSU allocates `slot` to a request.
    LsuReqEnq {
        /// LSU slot.
        slot: usize,
    },
    /// Monotonic count of instructions the RTL has accepted.
    InstCount,
}

impl Signal {
    /// Memory channel signal.
    pub const fn tl(channel: usize, field: TlField) -> Self {
        Self::Tl { channel, field }
    }

    /// Lane write port signal.
    pub const fn lane(lane: usize, field: VrfWriteField) -> Self {
        Self::LaneWrite { lane, field }
    }

    /// Write-queue enqueue port signal.
    pub const fn queue(slot: usize, field: VrfWriteField) -> Self {
        Self::WriteQueue { slot, field }
    }
}

/// Hierarchical name of the signal in the Verilated top, for name-based simulator bindings.
impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock => f.write_str("TOP.clock"),
            Self::Reset => f.write_str("TOP.reset"),
            Self::Tl { channel, field } => write!(f, "TOP.memoryPorts_{channel}_{}", field.name()),
            Self::Issue(field) => write!(f, "TOP.{}", field.name()),
            Self::LaneWrite { lane, field } => {
                write!(f, "TOP.V.laneVec_{lane}.vrf.write_{}", field.name())
            }
            Self::WriteQueue { slot, field } => match field {
                VrfWriteField::Valid => write!(f, "TOP.V.lsu.writeQueueVec_{slot}.io_enq_valid"),
                VrfWriteField::TargetLane => {
                    write!(f, "TOP.V.lsu.writeQueueVec_{slot}.io_enq_bits_targetLane")
                }
                other => write!(
                    f,
                    "TOP.V.lsu.writeQueueVec_{slot}.io_enq_bits_data_{}",
                    other.name()
                ),
            },
            Self::LsuReqEnq { slot } => write!(f, "TOP.V.lsu.reqEnq_debug_{slot}"),
            Self::InstCount => f.write_str("TOP.V.instCount"),
        }
    }
}

/// Integer access to the RTL's signals.
///
/// `set_int` only stages a value; it becomes visible to the model's logic on the next `eval`.
/// A rising edge is `set_int(Signal::Clock, 1)` followed by `eval` with the clock previously
/// low.
pub trait SignalBus {
    /// Reads the current value of `signal`.
    fn get_int(&self, signal: Signal) -> u64;
    /// Drives `signal` to `value`.
    fn set_int(&mut self, signal: Signal, value: u64);
    /// Settles the model's logic against the driven inputs.
    fn eval(&mut self);

    /// Reads `signal` as a boolean.
    fn get_bool(&self, signal: Signal) -> bool {
        self.get_int(signal) != 0
    }

    /// Drives `signal` with a boolean.
    fn set_bool(&mut self, signal: Signal, value: bool) {
        self.set_int(signal, u64::from(value));
    }
}

/// Receiver of waveform snapshots.
pub trait TraceSink {
    /// Opens the waveform file at `path`; called before reset when `run.wave` is set.
    ///
    /// # Errors
    ///
    /// Returns the I/O failure that prevented creating the file.
    fn open(&mut self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    /// Records the full state of `dut` at simulation `time` (half-cycle units).
    fn dump(&mut self, time: u64, dut: &dyn SignalBus);

    /// Flushes and closes the trace; called once when the run ends.
    fn close(&mut self) {}
}

/// Trace sink that discards every snapshot.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrace;

impl TraceSink for NullTrace {
    fn dump(&mut self, _time: u64, _dut: &dyn SignalBus) {}
}
