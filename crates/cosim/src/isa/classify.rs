//! Instruction classification.
//!
//! Classifies a fetched encoding by fixed bit-field tests. Only the classes with effects the
//! vector unit makes visible on its ports are distinguished; everything else is `Other`.

use super::fields::{self, extract};
use super::opcodes::{
    FUNCT3_OPFVV, FUNCT3_OPMVV, FUNCT6_WUNARY0, OP_LOAD_FP, OP_STORE_FP, OP_SYSTEM, OP_V,
};

/// Class of a fetched instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsnClass {
    /// Vector load.
    Load,
    /// Vector store.
    Store,
    /// Vector arithmetic or configuration instruction.
    Vector {
        /// `funct3` (operand category).
        funct3: u32,
        /// `funct6`.
        funct6: u32,
    },
    /// CSR instruction that writes `csr`.
    CsrWrite {
        /// Target CSR address.
        csr: u32,
    },
    /// Anything the vector unit never sees.
    Other,
}

/// Returns true when `width` encodes a vector memory element width.
///
/// Vector loads/stores share their major opcode with scalar FP loads/stores. The vector
/// widths are 000, 101, 110 and 111; `(width - 1) & 0b100` is set for exactly those.
#[inline]
const fn is_vector_width(width: u32) -> bool {
    (width.wrapping_sub(1) & 0b100) != 0
}

impl InsnClass {
    /// True for vector instructions that return a result to the scalar register file.
    ///
    /// The scalar side consumes that result immediately, so every earlier vector instruction
    /// has to retire first.
    pub const fn is_vector_fence(self) -> bool {
        match self {
            Self::Vector { funct3, funct6 } => {
                funct6 == FUNCT6_WUNARY0 && (funct3 == FUNCT3_OPMVV || funct3 == FUNCT3_OPFVV)
            }
            _ => false,
        }
    }
}

/// Classifies a 32-bit instruction encoding.
pub const fn classify(inst: u32) -> InsnClass {
    let opcode = extract(inst, fields::OPCODE);
    let width = extract(inst, fields::WIDTH);
    let rs1 = extract(inst, fields::RS1);

    match opcode {
        OP_LOAD_FP if is_vector_width(width) => InsnClass::Load,
        OP_STORE_FP if is_vector_width(width) => InsnClass::Store,
        OP_V => InsnClass::Vector {
            funct3: width,
            funct6: extract(inst, fields::FUNCT6),
        },
        // CSRRW/CSRRWI always write; CSRRS/CSRRC (and their immediate forms) only with a
        // non-zero source.
        OP_SYSTEM if (width & 0b011) != 0 && ((width & 0b100) | rs1) != 0 => InsnClass::CsrWrite {
            csr: extract(inst, fields::CSR),
        },
        _ => InsnClass::Other,
    }
}
