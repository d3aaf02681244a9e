//! Bus transaction emulator.
//!
//! Plays the memory side of the RTL's load/store ports. Every request is checked against the
//! accesses the reference model recorded for the owning instruction, then answered after a
//! fixed latency. It provides:
//! 1. **Intake:** Validation of inbound reads and writes against the expected-access records.
//! 2. **Response:** Per-channel latency countdown and presentation of one response per cycle.
//! 3. **Flow Control:** None; the request side is always ready.

/// Per-channel in-flight transactions and TileLink opcodes.
pub mod channel;

use tracing::debug;

use crate::common::CosimError;
use crate::config::DutConfig;
use crate::core::PendingQueue;
use crate::dut::{Signal, SignalBus, TlField};
use crate::stats::CosimStats;

use self::channel::{Channel, InFlight, TxKind, opcode};

/// Size in bytes of a log2-encoded transfer size; zero if it cannot be represented.
#[inline]
pub const fn decode_size(encoded: u64) -> u32 {
    if encoded < 32 { 1 << encoded } else { 0 }
}

/// Keeps the low `size` bytes of `value`.
#[inline]
const fn truncate(value: u64, size: u32) -> u64 {
    if size >= 8 {
        value
    } else {
        value & ((1 << (8 * size)) - 1)
    }
}

/// Memory agent answering the RTL's bus requests.
#[derive(Debug)]
pub struct BusEmulator {
    channels: Vec<Channel>,
    latency: u64,
    slot_mask: u64,
}

impl BusEmulator {
    /// Creates an emulator with `channels` idle channels.
    ///
    /// # Arguments
    ///
    /// * `channels` - Independent request/response ports.
    /// * `latency` - Cycles from accepting a request to presenting its response.
    /// * `slot_mask` - Bits of the source tag that name the requesting LSU slot.
    pub fn new(channels: usize, latency: u64, slot_mask: u64) -> Self {
        Self {
            channels: (0..channels).map(|_| Channel::new()).collect(),
            latency,
            slot_mask,
        }
    }

    /// Creates an emulator shaped by `config`.
    pub fn from_config(config: &DutConfig) -> Self {
        Self::new(config.channels, config.mem_latency, config.source_slot_mask)
    }

    /// Channel `index`.
    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    /// Transactions in flight across all channels.
    pub fn in_flight(&self) -> usize {
        self.channels.iter().map(Channel::len).sum()
    }

    /// Response step: counts latencies down and presents at most one response per channel.
    ///
    /// Runs before the clock edge so the RTL samples the response on that edge. A response
    /// the RTL is ready for is retired and its entry dropped within the same call.
    pub fn respond(&mut self, dut: &mut dyn SignalBus, cycle: u64, stats: &mut CosimStats) {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            channel.tick();

            let mut d_valid = false;
            if let Some((addr, tx)) = channel.next_response() {
                debug!(
                    cycle,
                    channel = index,
                    addr = format_args!("{addr:#010x}"),
                    source = format_args!("{:#06x}", tx.source),
                    data = format_args!("{:#x}", tx.data),
                    kind = ?tx.kind,
                    "return mem resp"
                );
                dut.set_int(Signal::tl(index, TlField::DOpcode), tx.kind.response_opcode());
                dut.set_int(Signal::tl(index, TlField::DData), tx.data);
                dut.set_int(Signal::tl(index, TlField::DSource), tx.source);
                dut.set_int(Signal::tl(index, TlField::DSize), tx.size);
                d_valid = true;
                if dut.get_bool(Signal::tl(index, TlField::DReady)) {
                    tx.done = true;
                    stats.bus_responses += 1;
                }
            }
            dut.set_bool(Signal::tl(index, TlField::DValid), d_valid);

            channel.collect();

            dut.set_bool(Signal::tl(index, TlField::AReady), true);
        }
    }

    /// Intake step: validates every valid request and queues its response.
    ///
    /// The owning instruction is the queued event holding the LSU slot named by the source
    /// tag. A read must match an expected read in address and size; a write must match an
    /// expected write in address, size and data.
    ///
    /// # Errors
    ///
    /// Returns the first protocol violation or unknown operation found on any channel.
    pub fn intake(
        &mut self,
        dut: &dyn SignalBus,
        queue: &mut PendingQueue,
        cycle: u64,
        stats: &mut CosimStats,
    ) -> Result<(), CosimError> {
        for (index, channel) in self.channels.iter_mut().enumerate() {
            if !dut.get_bool(Signal::tl(index, TlField::AValid)) {
                continue;
            }

            let op = dut.get_int(Signal::tl(index, TlField::AOpcode));
            let addr = dut.get_int(Signal::tl(index, TlField::AAddress));
            let size = dut.get_int(Signal::tl(index, TlField::ASize));
            let source = dut.get_int(Signal::tl(index, TlField::ASource));
            let bytes = decode_size(size);

            let kind = match op {
                opcode::GET => TxKind::Read,
                opcode::PUT_FULL_DATA => TxKind::Write,
                _ => {
                    return Err(CosimError::UnknownOperation {
                        cycle,
                        channel: index,
                        opcode: op,
                    });
                }
            };

            let slot = (source & self.slot_mask) as u8;
            let event = queue.by_slot_mut(slot).ok_or(CosimError::UnknownSource {
                cycle,
                channel: index,
                tag: source,
                slot,
            })?;
            if channel.contains(addr) {
                return Err(CosimError::DuplicateInFlight {
                    cycle,
                    channel: index,
                    addr,
                });
            }

            let data = match kind {
                TxKind::Read => {
                    let insn = event.describe();
                    let record = event
                        .reads
                        .get_mut(&addr)
                        .ok_or_else(|| CosimError::UnexpectedRead {
                            cycle,
                            addr,
                            insn: insn.clone(),
                        })?;
                    if record.size != bytes {
                        return Err(CosimError::ReadSizeMismatch {
                            cycle,
                            addr,
                            expected: record.size,
                            actual: bytes,
                            insn,
                        });
                    }
                    debug!(
                        cycle,
                        channel = index,
                        addr = format_args!("{addr:#010x}"),
                        size = bytes,
                        source = format_args!("{source:#06x}"),
                        data = format_args!("{:#x}", record.value),
                        "receive mem get req"
                    );
                    record.executed = true;
                    stats.bus_reads += 1;
                    record.value
                }
                TxKind::Write => {
                    let data = dut.get_int(Signal::tl(index, TlField::AData));
                    let insn = event.describe();
                    let record =
                        event
                            .writes
                            .mem
                            .get_mut(&addr)
                            .ok_or_else(|| CosimError::UnexpectedWrite {
                                cycle,
                                addr,
                                insn: insn.clone(),
                            })?;
                    if record.size != bytes {
                        return Err(CosimError::WriteSizeMismatch {
                            cycle,
                            addr,
                            expected: record.size,
                            actual: bytes,
                            insn,
                        });
                    }
                    if truncate(record.value, bytes) != truncate(data, bytes) {
                        return Err(CosimError::WriteDataMismatch {
                            cycle,
                            addr,
                            expected: record.value,
                            actual: data,
                            insn,
                        });
                    }
                    debug!(
                        cycle,
                        channel = index,
                        addr = format_args!("{addr:#010x}"),
                        size = bytes,
                        source = format_args!("{source:#06x}"),
                        data = format_args!("{data:#x}"),
                        "receive mem put req"
                    );
                    record.executed = true;
                    stats.bus_writes += 1;
                    data
                }
            };

            let _ = channel.accept(
                addr,
                InFlight {
                    data,
                    size,
                    source,
                    kind,
                    remaining: self.latency,
                    done: false,
                },
            );
        }
        Ok(())
    }
}
