//! # Unit Components
//!
//! Per-module suites for the harness. Each suite drives one component through its public
//! API; `lockstep` runs the whole driver against the behavioral fake DUT.



/// Error categories and diagnostics.
pub mod errors;



/// Event extraction from a scripted reference model.
pub mod oracle;


/// Register-file write verification.
pub mod vrf;
