//! Configuration for the co-simulation harness.
//!
//! This module defines the configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** The fixed knobs of the reference vector unit (lanes, channels, latency).
//! 2. **Structures:** Run parameters (image, trace, reset vector, timeout) and DUT knobs.
//! 3. **Validation:** Rejection of shapes the harness cannot drive.
//!
//! Configuration is supplied as JSON or built from `Config::default()`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default configuration constants.
mod defaults {
    /// Entry point the program image is loaded at.
    pub const RESET_VECTOR: u64 = 0x1000;

    /// Cycle bound after which the run fails with a timeout.
    pub const TIMEOUT: u64 = 10_000;

    /// Number of tracked events buffered ahead of the RTL.
    pub const QUEUE_DEPTH: usize = 5;

    /// Cycles between accepting a bus request and presenting its response.
    pub const MEM_LATENCY: u64 = 1;

    /// Independent memory request/response ports.
    pub const CHANNELS: usize = 2;

    /// Vector lanes writing the register file in parallel.
    pub const LANES: usize = 8;

    /// Load/store unit slots (MSHRs).
    pub const LSU_SLOTS: usize = 3;

    /// Bits of the bus source tag that select the LSU slot.
    pub const SOURCE_SLOT_MASK: u64 = 0b11;

    /// Vector register length in bits.
    pub const VLEN_BITS: usize = 1024;

    /// Architectural vector registers.
    pub const VREG_COUNT: usize = 32;

    /// Custom CSR whose write ends the simulation (`msimend`).
    pub const EXIT_CSR: u32 = 0x7cc;
}

/// Configuration rejected by `Config::validate`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A knob that must be non-zero is zero.
    #[error("`{0}` must be non-zero")]
    Zero(&'static str),

    /// More LSU slots than a slot id can name.
    #[error("lsu_slots = {0} exceeds the 255 addressable slots")]
    TooManySlots(usize),

    /// The register length does not split into 32-bit words across lanes.
    #[error("vlen_bits = {vlen_bits} is not a multiple of 32 * lanes ({lanes} lanes)")]
    LaneSplit {
        /// Configured register length.
        vlen_bits: usize,
        /// Configured lane count.
        lanes: usize,
    },

    /// The source-tag mask cannot name every LSU slot.
    #[error("source_slot_mask {mask:#x} cannot name all {slots} lsu slots")]
    SlotMask {
        /// Configured mask.
        mask: u64,
        /// Configured slot count.
        slots: usize,
    },

    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for this schema.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Root configuration.
///
/// # Examples
///
/// ```
/// use vcosim_core::config::Config;
///
/// let json = r#"{
///     "run": { "bin": "vadd.bin", "reset_vector": 4096, "timeout": 500 },
///     "dut": { "queue_depth": 8, "mem_latency": 3 }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.run.timeout, 500);
/// assert_eq!(config.dut.queue_depth, 8);
/// assert_eq!(config.dut.lanes, 8);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Per-run parameters.
    #[serde(default)]
    pub run: RunConfig,
    /// Shape of the vector unit under test.
    #[serde(default)]
    pub dut: DutConfig,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON and any `validate` failure.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, otherwise as `from_json`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Checks that the DUT shape is one the harness can drive.
    ///
    /// # Errors
    ///
    /// Returns the first knob found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dut = &self.dut;
        for (name, value) in [
            ("queue_depth", dut.queue_depth),
            ("channels", dut.channels),
            ("lanes", dut.lanes),
            ("lsu_slots", dut.lsu_slots),
            ("vlen_bits", dut.vlen_bits),
            ("vreg_count", dut.vreg_count),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero(name));
            }
        }
        if dut.mem_latency == 0 {
            return Err(ConfigError::Zero("mem_latency"));
        }
        if self.run.timeout == 0 {
            return Err(ConfigError::Zero("timeout"));
        }
        if dut.lsu_slots > usize::from(u8::MAX) {
            return Err(ConfigError::TooManySlots(dut.lsu_slots));
        }
        if dut.vlen_bits % (32 * dut.lanes) != 0 {
            return Err(ConfigError::LaneSplit {
                vlen_bits: dut.vlen_bits,
                lanes: dut.lanes,
            });
        }
        // Every slot id must survive masking unchanged.
        let highest = dut.lsu_slots as u64 - 1;
        let needed = u64::MAX.checked_shr(highest.leading_zeros()).unwrap_or(0);
        if needed & !dut.source_slot_mask != 0 {
            return Err(ConfigError::SlotMask {
                mask: dut.source_slot_mask,
                slots: dut.lsu_slots,
            });
        }
        Ok(())
    }
}

/// Parameters of a single run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    /// Program image executed by both sides.
    #[serde(default)]
    pub bin: PathBuf,

    /// Waveform output path handed to the trace sink, if any.
    #[serde(default)]
    pub wave: Option<PathBuf>,

    /// Address the image is loaded at and execution starts from.
    #[serde(default = "RunConfig::default_reset_vector")]
    pub reset_vector: u64,

    /// Cycle bound; reaching it fails the run.
    #[serde(default = "RunConfig::default_timeout")]
    pub timeout: u64,
}

impl RunConfig {
    const fn default_reset_vector() -> u64 {
        defaults::RESET_VECTOR
    }

    const fn default_timeout() -> u64 {
        defaults::TIMEOUT
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            bin: PathBuf::new(),
            wave: None,
            reset_vector: defaults::RESET_VECTOR,
            timeout: defaults::TIMEOUT,
        }
    }
}

/// Fixed knobs of the vector unit under test.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DutConfig {
    /// Tracked events buffered ahead of the RTL.
    pub queue_depth: usize,
    /// Bus response latency in cycles.
    pub mem_latency: u64,
    /// Independent bus channels.
    pub channels: usize,
    /// Vector lanes.
    pub lanes: usize,
    /// Load/store unit slots.
    pub lsu_slots: usize,
    /// Bits of the bus source tag selecting the LSU slot.
    pub source_slot_mask: u64,
    /// Vector register length in bits.
    pub vlen_bits: usize,
    /// Number of vector registers.
    pub vreg_count: usize,
    /// CSR whose write marks the end of the program.
    pub exit_csr: u32,
    /// Require every expected access of an event to be observed before it commits.
    pub check_commit: bool,
}

impl DutConfig {
    /// Bytes per vector register.
    pub const fn vlen_bytes(&self) -> usize {
        self.vlen_bits / 8
    }

    /// Bytes in the whole vector register file.
    pub const fn vrf_bytes(&self) -> usize {
        self.vlen_bytes() * self.vreg_count
    }
}

impl Default for DutConfig {
    fn default() -> Self {
        Self {
            queue_depth: defaults::QUEUE_DEPTH,
            mem_latency: defaults::MEM_LATENCY,
            channels: defaults::CHANNELS,
            lanes: defaults::LANES,
            lsu_slots: defaults::LSU_SLOTS,
            source_slot_mask: defaults::SOURCE_SLOT_MASK,
            vlen_bits: defaults::VLEN_BITS,
            vreg_count: defaults::VREG_COUNT,
            exit_csr: defaults::EXIT_CSR,
            check_commit: true,
        }
    }
}
