//! Major opcodes (bits 6-0) of the instruction classes the harness classifies, and the OP-V
//! minor opcodes that refine them.

/// Vector loads; shared with scalar floating-point loads (FLW, FLD).
pub const OP_LOAD_FP: u32 = 0b0000111;

/// Vector stores; shared with scalar floating-point stores (FSW, FSD).
pub const OP_STORE_FP: u32 = 0b0100111;

/// Vector arithmetic and configuration (OP-V).
pub const OP_V: u32 = 0b1010111;

/// System instructions (CSR access, ECALL, EBREAK).
pub const OP_SYSTEM: u32 = 0b1110011;

/// OP-V `funct3` of integer vector-vector operations (OPMVV).
pub const FUNCT3_OPMVV: u32 = 0b010;

/// OP-V `funct3` of floating-point vector-vector operations (OPFVV).
pub const FUNCT3_OPFVV: u32 = 0b001;

/// OP-V `funct6` of the unary groups VWXUNARY0 (under OPMVV) and VWFUNARY0 (under OPFVV):
/// `vmv.x.s`, `vcpop.m`, `vfirst.m` and `vfmv.f.s`, the vector instructions that hand a result
/// back to the scalar register file.
pub const FUNCT6_WUNARY0: u32 = 0b010000;
