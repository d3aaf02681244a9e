//! Register-File Write Verification Tests.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vcosim_core::core::{PendingQueue, TrackedEvent};
use vcosim_core::dut::{Signal, VrfWriteField};
use vcosim_core::stats::CosimStats;
use vcosim_core::vrf::{RtlWrite, ShadowVrf, VrfVerifier, WriteSource};
use vcosim_core::{Category, CosimError};

use crate::common::events::{load, vop, word};
use crate::common::signals::SignalMap;

const LANES: usize = 8;
const VLEN_BYTES: usize = 128;

struct Fixture {
    verifier: VrfVerifier,
    queue: PendingQueue,
    shadow: ShadowVrf,
    stats: CosimStats,
}

impl Fixture {
    fn new() -> Self {
        Self {
            verifier: VrfVerifier::new(LANES, 3, VLEN_BYTES),
            queue: PendingQueue::new(4),
            shadow: ShadowVrf::new(32, VLEN_BYTES),
            stats: CosimStats::default(),
        }
    }

    /// Queues `event` issued with `issue_idx`.
    fn issued(mut self, event: TrackedEvent, issue_idx: u32) -> Self {
        let seq = self.queue.push(event);
        self.queue.mark_issued(seq, issue_idx, 0).unwrap();
        self
    }

    fn record(&mut self, write: RtlWrite) -> Result<(), CosimError> {
        self.verifier
            .record(&write, &mut self.queue, &mut self.shadow, 1, &mut self.stats)
    }
}

fn lane_write(lane: u32, vd: u32, offset: u32, mask: u32, data: u32, issue_idx: u32) -> RtlWrite {
    RtlWrite {
        source: WriteSource::Lane,
        lane,
        vd,
        offset,
        mask,
        data,
        issue_idx,
    }
}

#[test]
fn test_byte_index_layout() {
    let verifier = VrfVerifier::new(LANES, 3, VLEN_BYTES);
    assert_eq!(verifier.byte_base(&lane_write(0, 0, 0, 0xf, 0, 0)), 0);
    assert_eq!(verifier.byte_base(&lane_write(3, 0, 0, 0xf, 0, 0)), 12);
    assert_eq!(verifier.byte_base(&lane_write(3, 2, 1, 0xf, 0, 0)), 2 * 128 + (3 + 8) * 4);
}

#[test]
fn test_recorded_bytes_match() {
    let bytes = [0x11, 0x22, 0x33, 0x44];
    let mut fx = Fixture::new().issued(vop(0x1000).with_vrf_bytes(128 + 8, &bytes), 3);

    fx.record(lane_write(2, 1, 0, 0xf, word(&bytes, 0), 3)).unwrap();

    let event = fx.queue.by_issue_mut(3).unwrap();
    assert!(event.writes.vrf.values().all(|r| r.matched));
    assert!(event.first_outstanding().is_none());
    assert_eq!(&fx.shadow.register(1).unwrap()[8..12], &bytes);
    assert_eq!(fx.stats.vrf_bytes_checked, 4);
}

#[test]
fn test_masked_bytes_untouched() {
    let mut fx = Fixture::new().issued(vop(0x1000).with_vrf_bytes(1, &[0xbb]), 0);

    fx.record(lane_write(0, 0, 0, 0b0010, 0xaaaa_bbaa, 0)).unwrap();

    assert_eq!(fx.shadow.get(0), Some(0));
    assert_eq!(fx.shadow.get(1), Some(0xbb));
    assert_eq!(fx.shadow.get(2), Some(0));
}

#[test]
fn test_recorded_byte_mismatch() {
    let mut fx = Fixture::new().issued(vop(0x1000).with_vrf_bytes(0, &[1, 2, 3, 4]), 0);

    let err = fx
        .record(lane_write(0, 0, 0, 0xf, 0x0409_0201, 0))
        .unwrap_err();

    assert_eq!(err.category(), Category::ConsistencyViolation);
    match err {
        CosimError::VrfByteMismatch {
            index,
            expected,
            actual,
            ..
        } => assert_eq!((index, expected, actual), (2, 3, 9)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_unrecorded_identical_rewrite_tolerated() {
    let mut fx = Fixture::new().issued(vop(0x1000), 0);
    let _ = fx.shadow.set(4, 0x5a);

    fx.record(lane_write(1, 0, 0, 0b0001, 0x5a, 0)).unwrap();

    assert_eq!(fx.stats.vrf_rewrites, 1);
    assert_eq!(fx.shadow.get(4), Some(0x5a));
}

#[test]
fn test_unrecorded_divergent_write() {
    let mut fx = Fixture::new().issued(vop(0x1000), 0);

    let err = fx.record(lane_write(1, 0, 0, 0b0001, 0x5a, 0)).unwrap_err();

    assert_eq!(err.category(), Category::CoverageViolation);
    assert!(matches!(
        err,
        CosimError::UnrecordedWrite {
            index: 4,
            written: 0x5a,
            original: 0,
            ..
        }
    ));
}

#[test]
fn test_unresolved_issue_index_tolerated() {
    let mut fx = Fixture::new().issued(vop(0x1000), 0);

    fx.record(lane_write(0, 5, 0, 0xf, 0xdead_beef, 77)).unwrap();

    assert_eq!(fx.stats.unresolved_writes, 1);
    assert_eq!(&fx.shadow.register(5).unwrap()[..4], &0xdead_beef_u32.to_le_bytes());
}

#[test]
fn test_lane_write_of_load_skipped() {
    let mut fx = Fixture::new().issued(load(0x1000, 0x2000, 4, 7).with_vrf_bytes(0, &[7]), 0);

    fx.record(lane_write(0, 0, 0, 0b0001, 0x99, 0)).unwrap();

    assert_eq!(fx.shadow.get(0), Some(0x99));
    assert_eq!(fx.stats.vrf_bytes_checked, 0);
    assert!(!fx.queue.by_issue_mut(0).unwrap().writes.vrf[&0].matched);
}

#[test]
fn test_queue_write_of_load_verified() {
    let mut fx = Fixture::new().issued(load(0x1000, 0x2000, 4, 7).with_vrf_bytes(0, &[7]), 0);
    let write = RtlWrite {
        source: WriteSource::WriteQueue,
        ..lane_write(0, 0, 0, 0b0001, 0x99, 0)
    };

    let err = fx.record(write).unwrap_err();
    assert!(matches!(
        err,
        CosimError::VrfByteMismatch {
            expected: 7,
            actual: 0x99,
            ..
        }
    ));
}

#[test]
fn test_index_out_of_range() {
    let mut fx = Fixture::new().issued(vop(0x1000), 0);

    let err = fx.record(lane_write(7, 31, 4, 0xf, 0, 0)).unwrap_err();

    assert_eq!(err.category(), Category::ConsistencyViolation);
    assert!(matches!(err, CosimError::VrfIndexOutOfRange { size: 4096, .. }));
}

#[test]
fn test_sample_lanes_reads_valid_ports_only() {
    let bytes = [1, 2, 3, 4];
    let mut fx = Fixture::new().issued(vop(0x1000).with_vrf_bytes(4, &bytes), 9);
    let port = |field| Signal::lane(1, field);
    let dut = SignalMap::new().with(&[
        (port(VrfWriteField::Valid), 1),
        (port(VrfWriteField::Mask), 0xf),
        (port(VrfWriteField::Data), u64::from(word(&bytes, 0))),
        (port(VrfWriteField::InstIndex), 9),
        (Signal::lane(2, VrfWriteField::Data), 0xffff_ffff),
        (Signal::lane(2, VrfWriteField::Mask), 0xf),
    ]);

    fx.verifier
        .sample_lanes(&dut, &mut fx.queue, &mut fx.shadow, 1, &mut fx.stats)
        .unwrap();

    assert_eq!(fx.stats.vrf_bytes_checked, 4);
    assert_eq!(fx.shadow.get(8), Some(0));
}

#[test]
fn test_sample_write_queue_decodes_one_hot_lane() {
    let mut fx = Fixture::new().issued(load(0x1000, 0x2000, 4, 0).with_vrf_bytes(20, &[0xab]), 2);
    let port = |field| Signal::queue(1, field);
    let dut = SignalMap::new().with(&[
        (port(VrfWriteField::Valid), 1),
        (port(VrfWriteField::TargetLane), 0b0010_0000),
        (port(VrfWriteField::Mask), 0b0001),
        (port(VrfWriteField::Data), 0xab),
        (port(VrfWriteField::InstIndex), 2),
    ]);

    fx.verifier
        .sample_write_queues(&dut, &mut fx.queue, &mut fx.shadow, 1, &mut fx.stats)
        .unwrap();

    assert_eq!(fx.shadow.get(20), Some(0xab));
    assert!(fx.queue.by_issue_mut(2).unwrap().writes.vrf[&20].matched);
}

#[test]
fn test_sample_write_queue_without_target_lane() {
    let mut fx = Fixture::new();
    let dut = SignalMap::new().with(&[(Signal::queue(0, VrfWriteField::Valid), 1)]);

    let err = fx
        .verifier
        .sample_write_queues(&dut, &mut fx.queue, &mut fx.shadow, 1, &mut fx.stats)
        .unwrap_err();
    assert_eq!(err.category(), Category::InvariantViolation);
}

proptest! {
    #[test]
    fn prop_shadow_last_write_wins(values in prop::collection::vec(any::<u8>(), 1..32), lane in 0u32..8) {
        let mut fx = Fixture::new();
        for &value in &values {
            // No queued event owns index 0, so every write only updates the shadow.
            fx.record(lane_write(lane, 3, 2, 0b0100, u32::from(value) << 16, 0)).unwrap();
        }
        let index = 3 * VLEN_BYTES + (lane as usize + LANES * 2) * 4 + 2;
        prop_assert_eq!(fx.shadow.get(index), values.last().copied());
        prop_assert_eq!(fx.stats.unresolved_writes, values.len() as u64);
    }
}
