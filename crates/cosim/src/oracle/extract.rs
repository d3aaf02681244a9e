//! Event extraction.
//!
//! Wraps a reference model and, for every instruction the vector unit sees, records what the
//! RTL is expected to do with it. Register-file effects are found by diffing a snapshot taken
//! before execution against the state after it.

use std::io;
use std::path::Path;

use tracing::trace;

use super::{Oracle, ReferenceModel};
use crate::common::OracleFault;
use crate::core::{EventKind, TrackedEvent};
use crate::isa::{classify, fields};

/// `Oracle` producing tracked events from a `ReferenceModel`.
#[derive(Debug)]
pub struct ExtractingOracle<M> {
    model: M,
    exit_csr: u32,
}

impl<M: ReferenceModel> ExtractingOracle<M> {
    /// Wraps `model`. A write to `exit_csr` ends the program.
    pub const fn new(model: M, exit_csr: u32) -> Self {
        Self { model, exit_csr }
    }

    /// Wrapped model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    fn build(&mut self, pc: u64, inst: u32, kind: EventKind) -> Result<TrackedEvent, OracleFault> {
        let rs1 = self.model.xreg(fields::extract(inst, fields::RS1));
        let rs2 = self.model.xreg(fields::extract(inst, fields::RS2));
        let csrs = self.model.vector_csrs();
        let before = self.model.vrf().to_vec();

        let log = self
            .model
            .execute(inst)
            .map_err(|trap| OracleFault::new(pc, trap))?;

        let mut event = TrackedEvent::new(pc, inst, kind)
            .with_operands(rs1, rs2)
            .with_csrs(csrs);

        for (index, (&old, &new)) in before.iter().zip(self.model.vrf()).enumerate() {
            if old != new {
                event = event.with_vrf_bytes(index, &[new]);
            }
        }
        for read in &log.mem_reads {
            event = event.with_read(read.addr, read.size, read.value);
        }
        for write in &log.mem_writes {
            event = event.with_write(write.addr, write.size, write.value);
        }
        if let Some((rd, value)) = log.xreg_write.filter(|&(rd, _)| rd != 0) {
            event = event.with_rd(rd, value);
        }
        Ok(event)
    }
}

impl<M: ReferenceModel> Oracle for ExtractingOracle<M> {
    fn reset(&mut self) {
        self.model.reset();
    }

    fn load_image(&mut self, path: &Path, entry: u64) -> io::Result<()> {
        self.model.load_image(path, entry)
    }

    fn step(&mut self) -> Result<Option<TrackedEvent>, OracleFault> {
        let pc = self.model.pc();
        let inst = self
            .model
            .fetch()
            .map_err(|trap| OracleFault::new(pc, trap))?;

        let kind = EventKind::from_class(classify(inst), self.exit_csr);
        let event = match kind {
            None => {
                let _ = self
                    .model
                    .execute(inst)
                    .map_err(|trap| OracleFault::new(pc, trap))?;
                None
            }
            Some(kind) if kind.is_marker() => {
                let _ = self
                    .model
                    .execute(inst)
                    .map_err(|trap| OracleFault::new(pc, trap))?;
                Some(TrackedEvent::new(pc, inst, kind))
            }
            Some(kind) => Some(self.build(pc, inst, kind)?),
        };

        trace!(
            pc = format_args!("{pc:#010x}"),
            inst = format_args!("{inst:#010x}"),
            tracked = ?event.as_ref().map(|e| e.kind),
            "oracle step"
        );
        Ok(event)
    }
}
