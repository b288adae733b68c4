//! Pulse-driven event scheduler
//!
//! Single-threaded: the owner calls [`EventQueue::advance`] once per pulse and
//! handles whatever comes due. Cancellation is lazy; a cancelled entry stays in
//! the heap until its due pulse and is skipped there.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Handle to a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    due: u64,
    payload: T,
}

#[derive(Debug)]
pub struct EventQueue<T> {
    now: u64,
    next_seq: u64,
    heap: BinaryHeap<Reverse<(u64, u64)>>,
    pending: HashMap<u64, Pending<T>>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_seq: 0,
            heap: BinaryHeap::new(),
            pending: HashMap::new(),
        }
    }

    /// Current pulse
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Schedule `payload` to come due `delay` pulses from now (at least one)
    pub fn schedule(&mut self, payload: T, delay: u64) -> EventHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let due = self.now.saturating_add(delay.max(1));
        self.heap.push(Reverse((due, seq)));
        self.pending.insert(seq, Pending { due, payload });
        EventHandle(seq)
    }

    /// Cancel a pending event. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: EventHandle) -> bool {
        self.pending.remove(&handle.0).is_some()
    }

    /// Pulses until the event fires, if it is still pending
    pub fn remaining(&self, handle: EventHandle) -> Option<u64> {
        self.pending
            .get(&handle.0)
            .map(|pending| pending.due.saturating_sub(self.now))
    }

    pub fn is_pending(&self, handle: EventHandle) -> bool {
        self.pending.contains_key(&handle.0)
    }

    /// Number of live (not cancelled) events
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop the next event due at or before the current pulse
    pub fn pop_due(&mut self) -> Option<T> {
        self.pop_due_entry().map(|(_, payload)| payload)
    }

    /// Like [`EventQueue::pop_due`], also returning the handle it was scheduled under
    pub fn pop_due_entry(&mut self) -> Option<(EventHandle, T)> {
        while let Some(Reverse((due, seq))) = self.heap.peek().copied() {
            if due > self.now {
                return None;
            }
            self.heap.pop();
            if let Some(pending) = self.pending.remove(&seq) {
                return Some((EventHandle(seq), pending.payload));
            }
        }
        None
    }

    /// Advance one pulse and drain everything that came due, in due then FIFO order
    pub fn advance(&mut self) -> Vec<T> {
        self.advance_entries().into_iter().map(|(_, payload)| payload).collect()
    }

    /// Advance one pulse and drain every due event together with its handle
    pub fn advance_entries(&mut self) -> Vec<(EventHandle, T)> {
        self.now += 1;
        let mut due = Vec::new();
        while let Some(entry) = self.pop_due_entry() {
            due.push(entry);
        }
        due
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let mut queue = EventQueue::new();
        queue.schedule("a", 3);
        assert!(queue.advance().is_empty());
        assert!(queue.advance().is_empty());
        assert_eq!(queue.advance(), vec!["a"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_within_pulse() {
        let mut queue = EventQueue::new();
        queue.schedule(1, 2);
        queue.schedule(2, 1);
        queue.schedule(3, 2);
        assert_eq!(queue.advance(), vec![2]);
        assert_eq!(queue.advance(), vec![1, 3]);
    }

    #[test]
    fn test_cancel() {
        let mut queue = EventQueue::new();
        let handle = queue.schedule("gone", 1);
        assert_eq!(queue.remaining(handle), Some(1));
        assert!(queue.cancel(handle));
        assert!(!queue.cancel(handle));
        assert!(queue.advance().is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_zero_delay_waits_one_pulse() {
        let mut queue = EventQueue::new();
        let handle = queue.schedule((), 0);
        assert!(queue.pop_due().is_none());
        assert!(queue.is_pending(handle));
        assert_eq!(queue.advance().len(), 1);
    }

    #[test]
    fn test_entries_carry_their_handle() {
        let mut queue = EventQueue::new();
        let first = queue.schedule("first", 1);
        let second = queue.schedule("second", 1);
        assert_ne!(first, second);
        assert_eq!(queue.advance_entries(), vec![(first, "first"), (second, "second")]);
        assert!(!queue.is_pending(first));
    }
}
