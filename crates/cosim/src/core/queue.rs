//! Pending event queue.
//!
//! The queue is the reorder buffer between reference-model program order and RTL timing.
//! It provides:
//! 1. **Ordering:** Events are appended in program order and commit from the oldest end.
//! 2. **Issue:** At most the oldest unissued event is offered to the RTL at a time.
//! 3. **Lookup:** `issue_idx` and `lsu_slot` indexes resolve RTL activity to its event in O(1).
//! 4. **Invariants:** Issue indexes are unique and strictly increasing; slot ids are unique
//!    among events that still expect bus traffic.

use std::collections::{HashMap, VecDeque};

use crate::common::CosimError;
use crate::core::event::{IssueState, TrackedEvent};

/// In-order buffer of tracked events not yet committed by the RTL.
#[derive(Debug)]
pub struct PendingQueue {
    /// Events, oldest at the front. Sequence numbers are contiguous.
    events: VecDeque<TrackedEvent>,
    /// Number of events the fill phase buffers ahead.
    depth: usize,
    /// Sequence number of the next pushed event.
    next_seq: u64,
    /// `issue_idx` to sequence number.
    by_issue: HashMap<u32, u64>,
    /// `lsu_slot` to sequence number.
    by_slot: HashMap<u8, u64>,
    /// Most recent issue index stamped.
    last_issue_idx: Option<u32>,
}

impl PendingQueue {
    /// Creates an empty queue that fills up to `depth` events.
    pub fn new(depth: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(depth),
            depth,
            next_seq: 0,
            by_issue: HashMap::new(),
            by_slot: HashMap::new(),
            last_issue_idx: None,
        }
    }

    /// Configured fill depth.
    #[inline]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Number of queued events.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when no event is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True when the fill phase must stop.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.depth
    }

    /// Appends an event in program order and returns its sequence number.
    pub fn push(&mut self, mut event: TrackedEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        event.seq = seq;
        event.state = IssueState::Pending;
        self.events.push_back(event);
        seq
    }

    /// Oldest queued event.
    pub fn oldest(&self) -> Option<&TrackedEvent> {
        self.events.front()
    }

    /// Mutable oldest queued event.
    pub fn oldest_mut(&mut self) -> Option<&mut TrackedEvent> {
        self.events.front_mut()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TrackedEvent> {
        self.events.iter()
    }

    fn position(&self, seq: u64) -> Option<usize> {
        let front = self.events.front()?.seq;
        let pos = usize::try_from(seq.checked_sub(front)?).ok()?;
        (pos < self.events.len()).then_some(pos)
    }

    /// Event with sequence number `seq`.
    pub fn get(&self, seq: u64) -> Option<&TrackedEvent> {
        self.position(seq).map(|pos| &self.events[pos])
    }

    /// Mutable event with sequence number `seq`.
    pub fn get_mut(&mut self, seq: u64) -> Option<&mut TrackedEvent> {
        self.position(seq).map(|pos| &mut self.events[pos])
    }

    /// Sequence number of the oldest event the RTL has not accepted yet.
    pub fn oldest_unissued(&self) -> Option<u64> {
        self.events
            .iter()
            .find(|e| e.state == IssueState::Pending)
            .map(|e| e.seq)
    }

    /// True while any queued event is unissued.
    pub fn has_unissued(&self) -> bool {
        self.oldest_unissued().is_some()
    }

    /// Marks `seq` issued with the RTL instruction index `issue_idx`.
    ///
    /// # Errors
    ///
    /// Returns `CosimError::InvariantViolation` if `seq` is unknown or already issued, or if
    /// the index is already held or does not exceed the last one stamped.
    pub fn mark_issued(&mut self, seq: u64, issue_idx: u32, cycle: u64) -> Result<(), CosimError> {
        if let Some(&holder) = self.by_issue.get(&issue_idx) {
            return Err(CosimError::invariant(
                cycle,
                format!("issue index {issue_idx} already held by event #{holder}"),
            ));
        }
        if let Some(last) = self.last_issue_idx {
            if issue_idx <= last {
                return Err(CosimError::invariant(
                    cycle,
                    format!("issue index {issue_idx} does not follow {last}"),
                ));
            }
        }
        let event = self
            .get_mut(seq)
            .ok_or_else(|| CosimError::invariant(cycle, format!("issuing unknown event #{seq}")))?;
        if event.issue_idx.is_some() {
            return Err(CosimError::invariant(
                cycle,
                format!("event {event} issued twice"),
            ));
        }
        event.state = IssueState::Issued;
        event.issue_idx = Some(issue_idx);
        let _ = self.by_issue.insert(issue_idx, seq);
        self.last_issue_idx = Some(issue_idx);
        Ok(())
    }

    /// Newest issued load/store still waiting for its LSU slot.
    pub fn newest_awaiting_slot(&self) -> Option<u64> {
        self.events
            .iter()
            .rev()
            .find(|e| e.is_issued() && e.kind.is_mem() && e.lsu_slot.is_none())
            .map(|e| e.seq)
    }

    /// Assigns LSU `slot` to event `seq`.
    ///
    /// A slot still held by an older event is taken over only once that event has no memory
    /// access outstanding; otherwise the two would be indistinguishable on the bus.
    ///
    /// # Errors
    ///
    /// Returns `CosimError::InvariantViolation` on an unknown event, a second slot for the
    /// same event, or a slot still in use.
    pub fn assign_slot(&mut self, seq: u64, slot: u8, cycle: u64) -> Result<(), CosimError> {
        if let Some(&holder) = self.by_slot.get(&slot) {
            if let Some(previous) = self.get(holder) {
                if previous.has_pending_mem() {
                    return Err(CosimError::invariant(
                        cycle,
                        format!("lsu slot {slot} still owned by {previous}"),
                    ));
                }
            }
        }
        let event = self
            .get_mut(seq)
            .ok_or_else(|| CosimError::invariant(cycle, format!("slotting unknown event #{seq}")))?;
        if event.lsu_slot.is_some() {
            return Err(CosimError::invariant(
                cycle,
                format!("event {event} assigned a second lsu slot"),
            ));
        }
        event.lsu_slot = Some(slot);
        let _ = self.by_slot.insert(slot, seq);
        Ok(())
    }

    /// Event that currently owns LSU `slot`.
    pub fn by_slot_mut(&mut self, slot: u8) -> Option<&mut TrackedEvent> {
        let seq = *self.by_slot.get(&slot)?;
        self.get_mut(seq)
    }

    /// Event stamped with RTL instruction index `issue_idx`.
    pub fn by_issue_mut(&mut self, issue_idx: u32) -> Option<&mut TrackedEvent> {
        let seq = *self.by_issue.get(&issue_idx)?;
        self.get_mut(seq)
    }

    /// Removes the oldest event, dropping its index entries.
    pub fn pop_oldest(&mut self) -> Option<TrackedEvent> {
        let mut event = self.events.pop_front()?;
        if let Some(idx) = event.issue_idx {
            let _ = self.by_issue.remove(&idx);
        }
        if let Some(slot) = event.lsu_slot {
            if self.by_slot.get(&slot) == Some(&event.seq) {
                let _ = self.by_slot.remove(&slot);
            }
        }
        event.state = IssueState::Committed;
        Some(event)
    }
}
