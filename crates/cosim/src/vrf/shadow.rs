//! Shadow copy of the RTL's vector register file.
//!
//! Holds the last byte the RTL wrote at every register-file position, whether or not the
//! write was predicted. Unrecorded writes are judged against it.

/// Byte-addressed mirror of the vector register file.
#[derive(Debug, Clone)]
pub struct ShadowVrf {
    bytes: Vec<u8>,
    vlen_bytes: usize,
}

impl ShadowVrf {
    /// Creates a zeroed register file of `vreg_count` registers of `vlen_bytes` bytes.
    pub fn new(vreg_count: usize, vlen_bytes: usize) -> Self {
        Self {
            bytes: vec![0; vreg_count * vlen_bytes],
            vlen_bytes,
        }
    }

    /// Size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for a zero-sized register file.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at absolute index `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Overwrites the byte at `index`, returning the previous value.
    #[inline]
    pub fn set(&mut self, index: usize, byte: u8) -> Option<u8> {
        self.bytes
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, byte))
    }

    /// Bytes of vector register `vd`.
    pub fn register(&self, vd: usize) -> Option<&[u8]> {
        let start = vd.checked_mul(self.vlen_bytes)?;
        self.bytes.get(start..start + self.vlen_bytes)
    }
}
