//! Register-file write verification.
//!
//! Every register-file write the RTL performs is resolved to the instruction that issued it
//! and compared byte by byte with what the reference model recorded. It provides:
//! 1. **Sampling:** Reads the per-lane write ports and the per-slot write-queue enqueue ports.
//! 2. **Resolution:** Maps a write's issue index to its queued event.
//! 3. **Checking:** Recorded bytes must match exactly; unrecorded bytes must not change.
//! 4. **Shadowing:** Every observed byte lands in the shadow register file.

/// Shadow register file.
pub mod shadow;

use tracing::{debug, trace};

use crate::common::CosimError;
use crate::config::DutConfig;
use crate::core::{EventKind, PendingQueue};
use crate::dut::{Signal, SignalBus, VrfWriteField};
use crate::stats::CosimStats;

pub use shadow::ShadowVrf;

/// Port a register-file write was observed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteSource {
    /// Direct write port of a lane.
    Lane,
    /// Enqueue port of an LSU slot's deferred write queue.
    WriteQueue,
}

/// One observed register-file write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RtlWrite {
    /// Port the write was observed on.
    pub source: WriteSource,
    /// Destination lane.
    pub lane: u32,
    /// Destination register.
    pub vd: u32,
    /// Element offset within the lane's share of the register.
    pub offset: u32,
    /// 4-bit byte mask.
    pub mask: u32,
    /// 32-bit data word.
    pub data: u32,
    /// Issue index of the writing instruction.
    pub issue_idx: u32,
}

/// Checks observed register-file writes against recorded ones.
#[derive(Debug, Clone, Copy)]
pub struct VrfVerifier {
    lanes: usize,
    lsu_slots: usize,
    vlen_bytes: usize,
}

impl VrfVerifier {
    /// Creates a verifier for `lanes` lanes, `lsu_slots` write queues and `vlen_bytes`-byte registers.
    pub const fn new(lanes: usize, lsu_slots: usize, vlen_bytes: usize) -> Self {
        Self {
            lanes,
            lsu_slots,
            vlen_bytes,
        }
    }

    /// Creates a verifier shaped by `config`.
    pub const fn from_config(config: &DutConfig) -> Self {
        Self::new(config.lanes, config.lsu_slots, config.vlen_bytes())
    }

    /// Absolute register-file byte index of the first byte a write touches.
    pub const fn byte_base(&self, write: &RtlWrite) -> usize {
        write.vd as usize * self.vlen_bytes
            + (write.lane as usize + self.lanes * write.offset as usize) * 4
    }

    /// Samples and checks every valid lane write port.
    ///
    /// # Errors
    ///
    /// Propagates the first failed `record`.
    pub fn sample_lanes(
        &self,
        dut: &dyn SignalBus,
        queue: &mut PendingQueue,
        shadow: &mut ShadowVrf,
        cycle: u64,
        stats: &mut CosimStats,
    ) -> Result<(), CosimError> {
        for lane in 0..self.lanes {
            let port = |field| dut.get_int(Signal::lane(lane, field)) as u32;
            if port(VrfWriteField::Valid) == 0 {
                continue;
            }
            let write = RtlWrite {
                source: WriteSource::Lane,
                lane: lane as u32,
                vd: port(VrfWriteField::Vd),
                offset: port(VrfWriteField::Offset),
                mask: port(VrfWriteField::Mask),
                data: port(VrfWriteField::Data),
                issue_idx: port(VrfWriteField::InstIndex),
            };
            self.record(&write, queue, shadow, cycle, stats)?;
        }
        Ok(())
    }

    /// Samples and checks every valid write-queue enqueue port.
    ///
    /// # Errors
    ///
    /// Returns `CosimError::InvariantViolation` for an enqueue without a target lane and
    /// propagates the first failed `record`.
    pub fn sample_write_queues(
        &self,
        dut: &dyn SignalBus,
        queue: &mut PendingQueue,
        shadow: &mut ShadowVrf,
        cycle: u64,
        stats: &mut CosimStats,
    ) -> Result<(), CosimError> {
        for slot in 0..self.lsu_slots {
            let port = |field| dut.get_int(Signal::queue(slot, field)) as u32;
            if port(VrfWriteField::Valid) == 0 {
                continue;
            }
            let target = port(VrfWriteField::TargetLane);
            if target == 0 {
                return Err(CosimError::invariant(
                    cycle,
                    format!("write queue {slot} enqueued without a target lane"),
                ));
            }
            let write = RtlWrite {
                source: WriteSource::WriteQueue,
                lane: target.trailing_zeros(),
                vd: port(VrfWriteField::Vd),
                offset: port(VrfWriteField::Offset),
                mask: port(VrfWriteField::Mask),
                data: port(VrfWriteField::Data),
                issue_idx: port(VrfWriteField::InstIndex),
            };
            self.record(&write, queue, shadow, cycle, stats)?;
        }
        Ok(())
    }

    /// Checks one write and applies it to the shadow register file.
    ///
    /// Writes that resolve to no queued event, and lane writes of loads, are applied to the
    /// shadow without checking.
    ///
    /// # Errors
    ///
    /// Returns `VrfIndexOutOfRange`, `VrfByteMismatch` or `UnrecordedWrite`.
    pub fn record(
        &self,
        write: &RtlWrite,
        queue: &mut PendingQueue,
        shadow: &mut ShadowVrf,
        cycle: u64,
        stats: &mut CosimStats,
    ) -> Result<(), CosimError> {
        let base = self.byte_base(write);
        let last = base + 3;
        if last >= shadow.len() {
            return Err(CosimError::VrfIndexOutOfRange {
                cycle,
                index: last,
                size: shadow.len(),
            });
        }

        let mut event = match queue.by_issue_mut(write.issue_idx) {
            None => {
                debug!(
                    cycle,
                    issue_idx = write.issue_idx,
                    "rtl vrf write matches no queued event, maybe from a committed load"
                );
                stats.unresolved_writes += 1;
                None
            }
            Some(event) if event.kind == EventKind::Load && write.source == WriteSource::Lane => {
                trace!(cycle, insn = %event, "lane write of load data, certified on the bus");
                None
            }
            Some(event) => {
                debug!(
                    cycle,
                    source = ?write.source,
                    lane = write.lane,
                    vd = write.vd,
                    offset = write.offset,
                    mask = format_args!("{:04b}", write.mask),
                    data = format_args!("{:08x}", write.data),
                    insn = %event,
                    "rtl detect vrf write"
                );
                Some(event)
            }
        };

        for i in 0..4 {
            if (write.mask >> i) & 1 == 0 {
                continue;
            }
            let index = base + i;
            let written = (write.data >> (8 * i)) as u8;
            let original = shadow.get(index).unwrap_or_default();

            if let Some(event) = event.as_deref_mut() {
                if let Some(record) = event.writes.vrf.get_mut(&index) {
                    if record.byte != written {
                        return Err(CosimError::VrfByteMismatch {
                            cycle,
                            index,
                            lane: write.lane,
                            vd: write.vd,
                            offset: write.offset,
                            expected: record.byte,
                            actual: written,
                            insn: event.describe(),
                        });
                    }
                    record.matched = true;
                    stats.vrf_bytes_checked += 1;
                } else if original != written {
                    return Err(CosimError::UnrecordedWrite {
                        cycle,
                        index,
                        lane: write.lane,
                        vd: write.vd,
                        offset: write.offset,
                        written,
                        original,
                    });
                } else {
                    stats.vrf_rewrites += 1;
                }
            }

            let _ = shadow.set(index, written);
        }
        Ok(())
    }
}
