//! Event Extraction Tests.
//!
//! Runs `ExtractingOracle` over a scripted reference model and checks the tracked events it
//! builds from register-file diffs and commit logs.

use std::path::Path;

use pretty_assertions::assert_eq;
use vcosim_core::common::Trap;
use vcosim_core::core::{EventKind, MemRecord, ScalarWrite, VectorCsrs};
use vcosim_core::oracle::{CommitLog, ExtractingOracle, MemAccess, Oracle};

use crate::common::events::{CSRW_EXIT, FENCE, NOP, VADD, VLE32, VMV_X_S, VSE32};
use crate::common::mocks::{Effect, ScriptedModel};

const ENTRY: u64 = 0x1000;

fn oracle(model: ScriptedModel) -> ExtractingOracle<ScriptedModel> {
    let mut oracle = ExtractingOracle::new(model, 0x7cc);
    oracle.reset();
    oracle.load_image(Path::new("prog.bin"), ENTRY).unwrap();
    oracle
}

#[test]
fn test_untracked_instruction_executes_without_event() {
    let mut oracle = oracle(ScriptedModel::new(64).with_insn(ENTRY, NOP, Effect::default()));

    assert_eq!(oracle.step().unwrap(), None);
    assert_eq!(oracle.model().executed, vec![NOP]);
    assert_eq!(oracle.model().pc, ENTRY + 4);
    assert_eq!(oracle.model().resets, 1);
}

#[test]
fn test_vector_op_records_changed_bytes() {
    let effect = Effect {
        vrf_writes: vec![(16, 0xaa), (17, 0xbb), (18, 0)],
        ..Effect::default()
    };
    let mut model = ScriptedModel::new(64).with_insn(ENTRY, VADD, effect);
    model.csrs = VectorCsrs {
        vl: 4,
        vstart: 0,
        vtype: 0x10,
        vxrm: 2,
    };
    let mut oracle = oracle(model);

    let event = oracle.step().unwrap().unwrap();

    assert_eq!(event.kind, EventKind::VectorOp);
    assert_eq!(event.pc, ENTRY);
    assert_eq!(event.inst, VADD);
    assert_eq!(event.csrs.vl, 4);
    assert_eq!(event.csrs.vxrm, 2);
    // Byte 18 is rewritten with its old value and is therefore not expected.
    let recorded: Vec<(usize, u8)> = event.writes.vrf.iter().map(|(&i, r)| (i, r.byte)).collect();
    assert_eq!(recorded, vec![(16, 0xaa), (17, 0xbb)]);
    assert!(event.reads.is_empty());
}

#[test]
fn test_load_records_reads_and_operands() {
    let effect = Effect {
        vrf_writes: vec![(0, 42)],
        log: CommitLog {
            mem_reads: vec![MemAccess::new(0x2000, 4, 42)],
            ..CommitLog::default()
        },
        ..Effect::default()
    };
    let mut model = ScriptedModel::new(64).with_insn(ENTRY, VLE32, effect);
    // vle32.v v1, (a0)
    model.xregs[10] = 0x2000;
    let mut oracle = oracle(model);

    let event = oracle.step().unwrap().unwrap();

    assert_eq!(event.kind, EventKind::Load);
    assert_eq!(event.rs1, 0x2000);
    assert_eq!(event.reads.get(&0x2000), Some(&MemRecord::new(4, 42)));
    assert_eq!(event.writes.vrf.len(), 1);
}

#[test]
fn test_store_records_writes() {
    let effect = Effect {
        log: CommitLog {
            mem_writes: vec![MemAccess::new(0x1000, 4, 0xDEAD_BEEF), MemAccess::new(0x1004, 4, 1)],
            ..CommitLog::default()
        },
        ..Effect::default()
    };
    let mut oracle = oracle(ScriptedModel::new(64).with_insn(ENTRY, VSE32, effect));

    let event = oracle.step().unwrap().unwrap();

    assert_eq!(event.kind, EventKind::Store);
    assert_eq!(event.writes.mem.len(), 2);
    assert_eq!(event.writes.mem[&0x1000].value, 0xDEAD_BEEF);
    assert!(event.writes.vrf.is_empty());
}

#[test]
fn test_scalar_destination_recorded_except_x0() {
    let effect = |rd| Effect {
        log: CommitLog {
            xreg_write: Some((rd, 9)),
            ..CommitLog::default()
        },
        ..Effect::default()
    };
    let mut oracle = oracle(
        ScriptedModel::new(64)
            .with_insn(ENTRY, VADD, effect(5))
            .with_insn(ENTRY + 4, VADD, effect(0)),
    );

    let first = oracle.step().unwrap().unwrap();
    assert_eq!(first.rd_write, Some(ScalarWrite { rd: 5, value: 9 }));
    let second = oracle.step().unwrap().unwrap();
    assert_eq!(second.rd_write, None);
}

#[test]
fn test_scalar_fence_is_untracked() {
    let mut oracle = oracle(
        ScriptedModel::new(64)
            .with_insn(ENTRY, FENCE, Effect::default())
            .with_insn(ENTRY + 4, VADD, Effect::default()),
    );

    assert_eq!(oracle.step().unwrap(), None);
    let next = oracle.step().unwrap().unwrap();
    assert_eq!(next.kind, EventKind::VectorOp);
    assert_eq!(oracle.model().executed, vec![FENCE, VADD]);
}

#[test]
fn test_markers_carry_no_expectations() {
    let effect = Effect {
        vrf_writes: vec![(3, 1)],
        log: CommitLog {
            xreg_write: Some((10, 7)),
            ..CommitLog::default()
        },
        ..Effect::default()
    };
    let mut oracle = oracle(
        ScriptedModel::new(64)
            .with_insn(ENTRY, VMV_X_S, effect)
            .with_insn(ENTRY + 4, CSRW_EXIT, Effect::default()),
    );

    let fence = oracle.step().unwrap().unwrap();
    assert_eq!(fence.kind, EventKind::FenceMarker);
    assert!(fence.writes.vrf.is_empty());
    assert_eq!(fence.rd_write, None);
    assert_eq!(oracle.model().xregs[10], 7);

    let exit = oracle.step().unwrap().unwrap();
    assert_eq!(exit.kind, EventKind::ExitMarker);
    assert_eq!(exit.pc, ENTRY + 4);
}

#[test]
fn test_fetch_fault_reports_pc() {
    let mut oracle = oracle(ScriptedModel::new(64));

    let fault = oracle.step().unwrap_err();
    assert_eq!(fault.pc, ENTRY);
    assert_eq!(fault.trap, Trap::InstructionAccessFault(ENTRY));
}

#[test]
fn test_execute_trap_reports_pc() {
    let effect = Effect {
        trap: Some(Trap::LoadAccessFault(0x2000)),
        ..Effect::default()
    };
    let mut oracle = oracle(ScriptedModel::new(64).with_insn(ENTRY, VLE32, effect));

    let fault = oracle.step().unwrap_err();
    assert_eq!(fault.pc, ENTRY);
    assert_eq!(fault.trap, Trap::LoadAccessFault(0x2000));
    assert!(fault.to_string().contains("LoadAccessFault"));
}
