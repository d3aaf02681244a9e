//! Failure Taxonomy Tests.

use std::collections::HashSet;
use std::io;

use pretty_assertions::assert_eq;
use rstest::rstest;
use vcosim_core::common::{AccessKind, OracleFault, Trap};
use vcosim_core::config::ConfigError;
use vcosim_core::{Category, CosimError};

const ALL: [Category; 9] = [
    Category::ProtocolViolation,
    Category::CoverageViolation,
    Category::ConsistencyViolation,
    Category::CapacityExhaustion,
    Category::UnresolvedTrap,
    Category::Timeout,
    Category::UnknownOperation,
    Category::InvariantViolation,
    Category::Setup,
];

#[test]
fn test_exit_codes_distinct_and_nonzero() {
    let codes: HashSet<i32> = ALL.iter().map(|c| c.exit_code()).collect();
    assert_eq!(codes.len(), ALL.len());
    assert!(!codes.contains(&0));
    assert!(!codes.contains(&1));
}

#[rstest]
#[case(
    CosimError::UnexpectedRead { cycle: 12, addr: 0x3000, insn: "#0".into() },
    Category::ProtocolViolation
)]
#[case(
    CosimError::UnknownSource { cycle: 12, channel: 1, tag: 7, slot: 3 },
    Category::ProtocolViolation
)]
#[case(
    CosimError::UnrecordedWrite {
        cycle: 12, index: 4, lane: 1, vd: 0, offset: 0, written: 0x5a, original: 0,
    },
    Category::CoverageViolation
)]
#[case(
    CosimError::UnexecutedAccess {
        cycle: 12, kind: AccessKind::MemWrite, location: 0x1000, insn: "#0".into(),
    },
    Category::ConsistencyViolation
)]
#[case(CosimError::NoFreeLsuSlot { cycle: 12, insn: "#0".into() }, Category::CapacityExhaustion)]
#[case(CosimError::Timeout { cycle: 12, bound: 12 }, Category::Timeout)]
#[case(
    CosimError::UnknownOperation { cycle: 12, channel: 0, opcode: 6 },
    Category::UnknownOperation
)]
#[case(
    CosimError::InvariantViolation { cycle: 12, detail: "duplicate issue index".into() },
    Category::InvariantViolation
)]
fn test_error_names_cycle_and_category(#[case] err: CosimError, #[case] category: Category) {
    assert_eq!(err.category(), category);
    assert_eq!(err.exit_code(), category.exit_code());
    assert!(err.to_string().starts_with("[12]"), "{err}");
}

#[test]
fn test_oracle_fault_converts() {
    let err: CosimError = OracleFault::new(0x1004, Trap::IllegalInstruction(0)).into();
    assert_eq!(err.category(), Category::UnresolvedTrap);
    assert!(err.to_string().contains("0x00001004"));
}

#[test]
fn test_config_error_converts() {
    let err: CosimError = ConfigError::Zero("queue_depth").into();
    assert_eq!(err.category(), Category::Setup);
    assert_eq!(err.to_string(), "`queue_depth` must be non-zero");
}

#[test]
fn test_image_error_names_path() {
    let err = CosimError::Image {
        path: "prog.bin".into(),
        source: io::Error::new(io::ErrorKind::NotFound, "gone"),
    };
    assert_eq!(err.category(), Category::Setup);
    assert_eq!(err.to_string(), "cannot load image prog.bin: gone");
}

#[test]
fn test_trace_error_names_path() {
    let err = CosimError::Trace {
        path: "run.fst".into(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
    };
    assert_eq!(err.category(), Category::Setup);
    assert_eq!(err.to_string(), "cannot open waveform run.fst: read-only");
}

#[test]
fn test_access_kind_display() {
    let err = CosimError::UnexecutedAccess {
        cycle: 3,
        kind: AccessKind::VrfByte,
        location: 140,
        insn: "#1".into(),
    };
    assert_eq!(
        err.to_string(),
        "[3] expect vrf write at 0x8c, not executed when commit (#1)"
    );
}

#[test]
fn test_category_display() {
    assert_eq!(Category::CapacityExhaustion.to_string(), "capacity exhaustion");
    assert_eq!(Category::Setup.to_string(), "setup error");
}
