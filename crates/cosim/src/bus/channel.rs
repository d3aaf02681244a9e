//! In-flight transactions of one memory channel.

use std::collections::BTreeMap;

/// TileLink-UL opcodes used on the A and D channels.
pub mod opcode {
    /// A: full-width write.
    pub const PUT_FULL_DATA: u64 = 0;
    /// A: masked write (not served).
    pub const PUT_PARTIAL_DATA: u64 = 1;
    /// A: read.
    pub const GET: u64 = 4;
    /// D: write acknowledgment.
    pub const ACCESS_ACK: u64 = 0;
    /// D: read acknowledgment with data.
    pub const ACCESS_ACK_DATA: u64 = 1;
}

/// Direction of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxKind {
    /// Read; the response carries data.
    Read,
    /// Write; the response is an acknowledgment only.
    Write,
}

impl TxKind {
    /// D-channel opcode of the response.
    pub const fn response_opcode(self) -> u64 {
        match self {
            Self::Read => opcode::ACCESS_ACK_DATA,
            Self::Write => opcode::ACCESS_ACK,
        }
    }
}

/// Accepted request waiting for its response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InFlight {
    /// Response data (reads) or the written data (writes, not returned).
    pub data: u64,
    /// Encoded size, log2 bytes, echoed on the response.
    pub size: u64,
    /// Source tag echoed on the response.
    pub source: u64,
    /// Direction.
    pub kind: TxKind,
    /// Cycles until the response may be presented.
    pub remaining: u64,
    /// Set once the RTL accepted the response.
    pub done: bool,
}

/// In-flight set of one channel, keyed by address.
#[derive(Debug, Default)]
pub struct Channel {
    in_flight: BTreeMap<u64, InFlight>,
}

impl Channel {
    /// Creates an idle channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions in flight.
    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// True when nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// True when a transaction at `addr` is in flight.
    pub fn contains(&self, addr: u64) -> bool {
        self.in_flight.contains_key(&addr)
    }

    /// Transaction in flight at `addr`.
    pub fn get(&self, addr: u64) -> Option<&InFlight> {
        self.in_flight.get(&addr)
    }

    /// Accepts a transaction. Returns false, leaving the channel unchanged, if `addr` is busy.
    pub fn accept(&mut self, addr: u64, tx: InFlight) -> bool {
        if self.contains(addr) {
            return false;
        }
        let _ = self.in_flight.insert(addr, tx);
        true
    }

    /// Counts down every pending latency by one cycle.
    pub fn tick(&mut self) {
        for tx in self.in_flight.values_mut() {
            tx.remaining = tx.remaining.saturating_sub(1);
        }
    }

    /// Lowest-addressed transaction whose latency has elapsed.
    pub fn next_response(&mut self) -> Option<(u64, &mut InFlight)> {
        self.in_flight
            .iter_mut()
            .find(|(_, tx)| tx.remaining == 0 && !tx.done)
            .map(|(&addr, tx)| (addr, tx))
    }

    /// Drops acknowledged transactions.
    pub fn collect(&mut self) {
        self.in_flight.retain(|_, tx| !tx.done);
    }
}
