//! One lockstep cycle.
//!
//! The order of the steps is load-bearing. Issue inputs are driven before the edge that
//! samples readiness; write-queue enqueues are sampled between the falling and rising edge;
//! lane writes, slot allocations and commits only after the rising edge that produces them.

use tracing::{debug, info};

use super::cosim::{Cosim, Phase};
use crate::common::CosimError;
use crate::core::{EventKind, TrackedEvent};
use crate::dut::{IssueField, Signal, SignalBus, TraceSink};
use crate::oracle::Oracle;

impl<O: Oracle, D: SignalBus, T: TraceSink> Cosim<O, D, T> {
    /// Offers the current state to the trace sink and advances trace time by a half cycle.
    fn dump(&mut self) {
        self.trace.dump(self.time, &self.dut);
        self.time += 1;
    }

    fn clock(&mut self, high: bool) {
        self.dut.set_bool(Signal::Clock, high);
        self.dut.eval();
    }

    /// Holds reset high for one full clock, then releases it for one more rising edge.
    pub(super) fn reset_dut(&mut self) {
        self.dut.set_bool(Signal::Reset, true);
        self.clock(false);
        self.dump();
        self.clock(true);
        self.dump();

        self.dut.set_bool(Signal::Reset, false);
        self.clock(false);
        self.dump();
        self.clock(true);
        self.dump();
        debug!("reset released");
    }

    /// Runs one full clock cycle presenting `target` for issue.
    ///
    /// Returns the next phase when a fence or exit marker retires at the head of the queue.
    pub(super) fn step_cycle(&mut self, target: Option<u64>) -> Result<Option<Phase>, CosimError> {
        self.drive_issue(target);
        self.bus.respond(&mut self.dut, self.cycle, &mut self.stats);

        // Settle combinational paths from the new inputs; the clock is already high.
        self.clock(true);

        if let Some(seq) = target {
            if let Some(phase) = self.handshake(seq)? {
                return Ok(Some(phase));
            }
        }

        self.bus
            .intake(&self.dut, &mut self.queue, self.cycle, &mut self.stats)?;

        // negedge
        self.clock(false);
        self.dump();
        self.cycle += 1;
        self.stats.cycles = self.cycle;

        self.verifier.sample_write_queues(
            &self.dut,
            &mut self.queue,
            &mut self.shadow,
            self.cycle,
            &mut self.stats,
        )?;

        // posedge
        self.clock(true);
        self.dump();

        self.update_lsu_slots()?;
        self.verifier.sample_lanes(
            &self.dut,
            &mut self.queue,
            &mut self.shadow,
            self.cycle,
            &mut self.stats,
        )?;
        self.commit()?;

        if self.cycle >= self.config.run.timeout {
            return Err(CosimError::Timeout {
                cycle: self.cycle,
                bound: self.config.run.timeout,
            });
        }
        Ok(None)
    }

    /// Drives the issue interface. Markers and an absent target leave the request invalid.
    fn drive_issue(&mut self, target: Option<u64>) {
        let event = target
            .and_then(|seq| self.queue.get(seq))
            .filter(|event| !event.kind.is_marker());

        let Some(event) = event else {
            self.dut.set_bool(Signal::Issue(IssueField::ReqValid), false);
            return;
        };
        let drive = [
            (IssueField::ReqValid, 1),
            (IssueField::Inst, u64::from(event.inst)),
            (IssueField::Src1, event.rs1),
            (IssueField::Src2, event.rs2),
            (IssueField::Vl, event.csrs.vl),
            (IssueField::Vstart, event.csrs.vstart),
            (IssueField::Vtype, event.csrs.vtype),
            (IssueField::Vxrm, event.csrs.vxrm),
        ];
        for (field, value) in drive {
            self.dut.set_int(Signal::Issue(field), value);
        }
    }

    /// Resolves the presented event against the RTL's readiness.
    ///
    /// A marker waits until it is alone in the queue: an exit marker then ends the run and a
    /// fence marker is retired without issue. A regular event is issued when the RTL is ready,
    /// stamped with the RTL's instruction counter.
    fn handshake(&mut self, seq: u64) -> Result<Option<Phase>, CosimError> {
        let cycle = self.cycle;
        let kind = self
            .queue
            .get(seq)
            .map(|event| event.kind)
            .ok_or_else(|| CosimError::invariant(cycle, format!("presented unknown event #{seq}")))?;

        if kind.is_marker() {
            if self.queue.len() > 1 {
                return Ok(None);
            }
            if kind == EventKind::ExitMarker {
                info!(cycle, "exit marker reached the head of the queue");
                return Ok(Some(Phase::Exit));
            }
            if let Some(fence) = self.queue.pop_oldest() {
                debug!(cycle, insn = %fence, "fence retired, all earlier events committed");
            }
            self.stats.fences += 1;
            return Ok(Some(Phase::Refill));
        }

        if self.dut.get_bool(Signal::Issue(IssueField::ReqReady)) {
            let count = self.dut.get_int(Signal::InstCount);
            let issue_idx = u32::try_from(count).map_err(|_| {
                CosimError::invariant(cycle, format!("instruction counter {count:#x} exceeds 32 bits"))
            })?;
            self.queue.mark_issued(seq, issue_idx, cycle)?;
            self.stats.issued += 1;
            if let Some(event) = self.queue.get(seq) {
                info!(cycle, issue_idx, insn = %event, "issue to rtl");
            }
        }
        Ok(None)
    }

    /// Binds the newest issued load/store without a slot to the slot the LSU just allocated.
    fn update_lsu_slots(&mut self) -> Result<(), CosimError> {
        let Some(seq) = self.queue.newest_awaiting_slot() else {
            return Ok(());
        };
        let allocated = (0..self.config.dut.lsu_slots)
            .find(|&slot| self.dut.get_int(Signal::LsuReqEnq { slot }) == 1);

        let Some(slot) = allocated else {
            return Err(CosimError::NoFreeLsuSlot {
                cycle: self.cycle,
                insn: self
                    .queue
                    .get(seq)
                    .map(TrackedEvent::describe)
                    .unwrap_or_default(),
            });
        };
        self.queue.assign_slot(seq, slot as u8, self.cycle)?;
        if let Some(event) = self.queue.get(seq) {
            info!(cycle = self.cycle, slot, insn = %event, "lsu slot allocated");
        }
        Ok(())
    }

    /// Retires the oldest event on a commit response.
    fn commit(&mut self) -> Result<(), CosimError> {
        if !self.dut.get_bool(Signal::Issue(IssueField::RespValid)) {
            return Ok(());
        }
        let cycle = self.cycle;
        let rtl_rd = self.dut.get_int(Signal::Issue(IssueField::RespData));
        let check_commit = self.config.dut.check_commit;

        let event = self
            .queue
            .oldest_mut()
            .ok_or_else(|| CosimError::invariant(cycle, "rtl committed with an empty queue"))?;
        if !event.is_issued() {
            return Err(CosimError::invariant(
                cycle,
                format!("rtl committed while the oldest event {event} is not issued"),
            ));
        }

        event.rtl_rd = Some(rtl_rd);
        if let Some(expected) = event.rd_write {
            if expected.value != rtl_rd {
                return Err(CosimError::RdMismatch {
                    cycle,
                    expected: expected.value,
                    actual: rtl_rd,
                    insn: event.describe(),
                });
            }
        }
        if check_commit {
            if let Some((kind, location)) = event.first_outstanding() {
                return Err(CosimError::UnexecutedAccess {
                    cycle,
                    kind,
                    location,
                    insn: event.describe(),
                });
            }
        }

        if let Some(event) = self.queue.pop_oldest() {
            info!(cycle, insn = %event, "rtl commit insn");
        }
        self.stats.committed += 1;
        Ok(())
    }
}
