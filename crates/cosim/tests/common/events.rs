use vcosim_core::core::{EventKind, TrackedEvent};

/// `vle32.v v1, (a0)`
pub const VLE32: u32 = 0x0205_6087;
/// `vse32.v v1, (a0)`
pub const VSE32: u32 = 0x0205_60a7;
/// `vadd.vv v1, v2, v3`
pub const VADD: u32 = 0x0221_80d7;
/// `vmv.x.s a0, v2`
pub const VMV_X_S: u32 = 0x4220_2557;
/// `fence`
pub const FENCE: u32 = 0x0ff0_000f;
/// `csrw 0x7cc, a0`
pub const CSRW_EXIT: u32 = 0x7cc5_1073;
/// `nop`
pub const NOP: u32 = 0x0000_0013;

pub fn load(pc: u64, addr: u64, size: u32, value: u64) -> TrackedEvent {
    TrackedEvent::new(pc, VLE32, EventKind::Load).with_read(addr, size, value)
}

pub fn store(pc: u64, addr: u64, size: u32, value: u64) -> TrackedEvent {
    TrackedEvent::new(pc, VSE32, EventKind::Store).with_write(addr, size, value)
}

pub fn vop(pc: u64) -> TrackedEvent {
    TrackedEvent::new(pc, VADD, EventKind::VectorOp)
}

pub fn fence(pc: u64) -> TrackedEvent {
    TrackedEvent::new(pc, VMV_X_S, EventKind::FenceMarker)
}

pub fn exit(pc: u64) -> TrackedEvent {
    TrackedEvent::new(pc, CSRW_EXIT, EventKind::ExitMarker)
}

/// Little-endian 32-bit word `index` of `bytes`.
pub fn word(bytes: &[u8], index: usize) -> u32 {
    let chunk = &bytes[index * 4..index * 4 + 4];
    u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
}
