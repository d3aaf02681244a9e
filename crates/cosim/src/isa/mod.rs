//! Instruction set definitions used by the harness.
//!
//! The harness only needs to know which instructions have RTL-visible effects worth
//! tracking. This module provides:
//! 1. **Opcodes:** Major opcodes of the instruction classes the vector unit handles.
//! 2. **Fields:** Named bit ranges of the 32-bit encoding.
//! 3. **Classification:** The decode function mapping an encoding to an `InsnClass`.

/// Instruction classification.
pub mod classify;

/// Named bit ranges of the instruction encoding.
pub mod fields;

/// Major opcodes.
pub mod opcodes;

pub use classify::{InsnClass, classify};
