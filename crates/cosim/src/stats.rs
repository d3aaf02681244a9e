//! Run statistics.
//!
//! Counters accumulated over one lockstep run. They describe how much of the reference
//! model's behavior was actually cross-checked, which is what to look at when a clean run
//! finishes suspiciously fast.

use std::fmt;
use std::time::{Duration, Instant};

/// Counters for one lockstep run.
#[derive(Clone, Debug)]
pub struct CosimStats {
    start_time: Instant,
    /// Full clock cycles simulated.
    pub cycles: u64,
    /// Tracked events produced by the reference model.
    pub events: u64,
    /// Fill phases run.
    pub fills: u64,
    /// Most events queued at the end of any fill phase.
    pub queue_high_water: usize,
    /// Events accepted by the RTL.
    pub issued: u64,
    /// Events committed by the RTL.
    pub committed: u64,
    /// Fence markers retired without issue.
    pub fences: u64,
    /// Bus read requests accepted.
    pub bus_reads: u64,
    /// Bus write requests accepted.
    pub bus_writes: u64,
    /// Bus responses accepted by the RTL.
    pub bus_responses: u64,
    /// Register-file bytes checked against a reference record.
    pub vrf_bytes_checked: u64,
    /// Unrecorded register-file bytes rewritten with their previous value.
    pub vrf_rewrites: u64,
    /// Register-file writes whose issue index matched no queued event.
    pub unresolved_writes: u64,
}

impl Default for CosimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            events: 0,
            fills: 0,
            queue_high_water: 0,
            issued: 0,
            committed: 0,
            fences: 0,
            bus_reads: 0,
            bus_writes: 0,
            bus_responses: 0,
            vrf_bytes_checked: 0,
            vrf_rewrites: 0,
            unresolved_writes: 0,
        }
    }
}

impl CosimStats {
    /// Wall-clock time since the counters were created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Simulated cycles per wall-clock second.
    #[allow(clippy::cast_precision_loss)]
    pub fn cycles_per_second(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.cycles as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for CosimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "cycles            {}", self.cycles)?;
        writeln!(
            f,
            "events            {} extracted, {} issued, {} committed, {} fences",
            self.events, self.issued, self.committed, self.fences
        )?;
        writeln!(
            f,
            "queue             {} fills, high water {}",
            self.fills, self.queue_high_water
        )?;
        writeln!(
            f,
            "bus               {} reads, {} writes, {} responses",
            self.bus_reads, self.bus_writes, self.bus_responses
        )?;
        write!(
            f,
            "vrf               {} bytes checked, {} rewrites, {} unresolved writes",
            self.vrf_bytes_checked, self.vrf_rewrites, self.unresolved_writes
        )
    }
}
