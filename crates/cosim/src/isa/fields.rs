//! Bit ranges of the 32-bit instruction encoding, as inclusive `(lo, hi)` pairs.

/// Major opcode.
pub const OPCODE: (u32, u32) = (0, 6);

/// `funct3`; the memory element width for loads/stores, the access kind for CSR instructions.
pub const WIDTH: (u32, u32) = (12, 14);

/// First source register (or the CSR immediate).
pub const RS1: (u32, u32) = (15, 19);

/// Second source register.
pub const RS2: (u32, u32) = (20, 24);

/// OP-V `funct6`.
pub const FUNCT6: (u32, u32) = (26, 31);

/// CSR address.
pub const CSR: (u32, u32) = (20, 31);

/// Extracts the inclusive bit range `(lo, hi)` of `inst`.
#[inline]
pub const fn extract(inst: u32, (lo, hi): (u32, u32)) -> u32 {
    let width = hi - lo + 1;
    if width >= 32 {
        inst >> lo
    } else {
        (inst >> lo) & ((1 << width) - 1)
    }
}
