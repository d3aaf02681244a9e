//! Common types shared by every harness component.
//!
//! This module provides:
//! 1. **Error Handling:** The crate-wide `CosimError` and its failure taxonomy.
//! 2. **Traps:** RISC-V exception causes reported by the reference model.

/// Error types and failure categories.
pub mod error;

/// Reference-model trap definitions.
pub mod trap;

pub use error::{AccessKind, Category, CosimError};
pub use trap::{OracleFault, Trap};
