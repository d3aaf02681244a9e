//! Harness state and the fill/drain loop.

use tracing::{debug, error, info};

use crate::bus::BusEmulator;
use crate::common::CosimError;
use crate::config::Config;
use crate::core::PendingQueue;
use crate::dut::{NullTrace, SignalBus, TraceSink};
use crate::oracle::Oracle;
use crate::stats::CosimStats;
use crate::vrf::{ShadowVrf, VrfVerifier};

/// Successful end of a run.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// Cycle at which the exit marker retired.
    pub cycles: u64,
    /// Counters of the run.
    pub stats: CosimStats,
}

/// What the driver does after a drain phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Phase {
    /// Step the oracle again.
    Refill,
    /// The exit marker retired.
    Exit,
}

/// Lockstep co-simulation of an oracle against an RTL model.
///
/// Holds the pending queue, shadow register file, bus emulator and counters exclusively;
/// nothing outside the driver mutates them.
#[derive(Debug)]
pub struct Cosim<O, D, T = NullTrace> {
    pub(super) config: Config,
    pub(super) oracle: O,
    pub(super) dut: D,
    pub(super) trace: T,
    pub(super) queue: PendingQueue,
    pub(super) shadow: ShadowVrf,
    pub(super) bus: BusEmulator,
    pub(super) verifier: VrfVerifier,
    pub(super) stats: CosimStats,
    /// Full clock cycles since reset was released.
    pub(super) cycle: u64,
    /// Half-cycle trace time, counted from the start of reset.
    pub(super) time: u64,
}

impl<O: Oracle, D: SignalBus> Cosim<O, D> {
    /// Creates a harness around `oracle` and `dut`.
    ///
    /// # Errors
    ///
    /// Returns `CosimError::Config` if `config` fails validation.
    pub fn new(config: Config, oracle: O, dut: D) -> Result<Self, CosimError> {
        config.validate()?;
        Ok(Self {
            queue: PendingQueue::new(config.dut.queue_depth),
            shadow: ShadowVrf::new(config.dut.vreg_count, config.dut.vlen_bytes()),
            bus: BusEmulator::from_config(&config.dut),
            verifier: VrfVerifier::from_config(&config.dut),
            stats: CosimStats::default(),
            cycle: 0,
            time: 0,
            config,
            oracle,
            dut,
            trace: NullTrace,
        })
    }
}

impl<O: Oracle, D: SignalBus, T: TraceSink> Cosim<O, D, T> {
    /// Replaces the trace sink.
    pub fn with_trace<U: TraceSink>(self, trace: U) -> Cosim<O, D, U> {
        Cosim {
            config: self.config,
            oracle: self.oracle,
            dut: self.dut,
            trace,
            queue: self.queue,
            shadow: self.shadow,
            bus: self.bus,
            verifier: self.verifier,
            stats: self.stats,
            cycle: self.cycle,
            time: self.time,
        }
    }

    /// Active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Oracle.
    pub const fn oracle(&self) -> &O {
        &self.oracle
    }

    /// RTL model.
    pub const fn dut(&self) -> &D {
        &self.dut
    }

    /// Mutable RTL model.
    pub const fn dut_mut(&mut self) -> &mut D {
        &mut self.dut
    }

    /// Trace sink.
    pub const fn trace(&self) -> &T {
        &self.trace
    }

    /// Pending event queue.
    pub const fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    /// Shadow register file.
    pub const fn shadow(&self) -> &ShadowVrf {
        &self.shadow
    }

    /// Run counters.
    pub const fn stats(&self) -> &CosimStats {
        &self.stats
    }

    /// Full clock cycles since reset was released.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Runs the program to its exit marker.
    ///
    /// Loads the image into the oracle, resets the RTL and alternates fill and drain phases
    /// until the exit marker retires. Any divergence ends the run immediately; the error is
    /// logged once here and returned.
    ///
    /// # Errors
    ///
    /// Returns the first divergence, trap, timeout or setup failure detected.
    pub fn run(&mut self) -> Result<Outcome, CosimError> {
        let result = self.execute();
        self.trace.close();

        match &result {
            Ok(outcome) => info!(cycles = outcome.cycles, "exit marker retired, run passed"),
            Err(err) => error!(
                cycle = self.cycle,
                category = %err.category(),
                exit_code = err.exit_code(),
                "{err}"
            ),
        }
        info!(
            cycles_per_second = self.stats.cycles_per_second(),
            "run statistics\n{}", self.stats
        );
        result
    }

    fn execute(&mut self) -> Result<Outcome, CosimError> {
        self.queue = PendingQueue::new(self.config.dut.queue_depth);
        self.shadow = ShadowVrf::new(self.config.dut.vreg_count, self.config.dut.vlen_bytes());
        self.bus = BusEmulator::from_config(&self.config.dut);
        self.stats = CosimStats::default();
        self.cycle = 0;
        self.time = 0;

        if let Some(path) = self.config.run.wave.clone() {
            self.trace
                .open(&path)
                .map_err(|source| CosimError::Trace { path: path.clone(), source })?;
            debug!(path = %path.display(), "waveform opened");
        }

        self.oracle.reset();
        let path = self.config.run.bin.clone();
        self.oracle
            .load_image(&path, self.config.run.reset_vector)
            .map_err(|source| CosimError::Image { path, source })?;

        self.reset_dut();

        loop {
            self.fill()?;
            if self.drain()? == Phase::Exit {
                return Ok(Outcome {
                    cycles: self.cycle,
                    stats: self.stats.clone(),
                });
            }
        }
    }

    /// Steps the oracle until the queue is full or a fence/exit marker is queued.
    fn fill(&mut self) -> Result<(), CosimError> {
        while !self.queue.is_full() {
            let Some(event) = self.oracle.step()? else {
                continue;
            };
            let boundary = event.kind.is_marker();
            let seq = self.queue.push(event);
            self.stats.events += 1;
            if boundary {
                debug!(cycle = self.cycle, seq, "batch boundary queued");
                break;
            }
        }
        let queued = self.queue.len();
        self.stats.fills += 1;
        self.stats.queue_high_water = self.stats.queue_high_water.max(queued);
        debug!(
            cycle = self.cycle,
            queued,
            "pending queue filled, start to simulate"
        );
        Ok(())
    }

    /// Clocks the RTL until the queue needs refilling or the exit marker retires.
    ///
    /// With every queued event issued and the queue at depth, the RTL keeps running without
    /// an issue request until a commit frees a place.
    fn drain(&mut self) -> Result<Phase, CosimError> {
        loop {
            let target = self.queue.oldest_unissued();
            if target.is_none() && !self.queue.is_full() {
                debug!(
                    cycle = self.cycle,
                    "all queued events are issued, restarting oracle"
                );
                return Ok(Phase::Refill);
            }
            if let Some(phase) = self.step_cycle(target)? {
                return Ok(phase);
            }
        }
    }
}
