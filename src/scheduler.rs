//! The engine's delayed-callback primitive (SPEC_FULL.md §5): a FIFO-
//! within-time priority queue, not a real timer. The engine is
//! single-threaded and deterministic, so "time" is a logical tick counter
//! the caller advances explicitly (the demo binary advances it once per
//! think-delay) rather than a wall clock - nothing here spawns a thread or
//! awaits, unlike the teacher's `tokio::time::interval` heartbeat.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry<T> {
    at: u64,
    seq: u64,
    guard: u64,
    payload: T,
}

impl<T: Eq> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Eq> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // BinaryHeap is a max-heap; reverse so the earliest (at, seq) pops first.
        Reverse((self.at, self.seq)).cmp(&Reverse((other.at, other.seq)))
    }
}

/// A deal-scoped queue of delayed callbacks. `guard` is typically the
/// current deal index: bumping it via [`Scheduler::invalidate`] silently
/// drops every pending callback from a previous deal, per §5's
/// cancellation rule.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Entry<T>>,
    next_seq: u64,
    current_guard: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler { queue: BinaryHeap::new(), next_seq: 0, current_guard: 0 }
    }
}

impl<T: Eq> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire at `now + delay`, guarded by the current deal.
    pub fn schedule_after(&mut self, now: u64, delay: u64, payload: T) {
        let entry = Entry { at: now + delay, seq: self.next_seq, guard: self.current_guard, payload };
        self.next_seq += 1;
        self.queue.push(entry);
    }

    /// Invalidate every callback scheduled before this call (e.g. starting
    /// a new deal); pending entries are dropped lazily as they're popped.
    pub fn invalidate(&mut self) {
        self.current_guard += 1;
    }

    /// Pop and return every callback due at or before `now`, in FIFO-
    /// within-time order, silently discarding any whose guard is stale.
    pub fn drain_due(&mut self, now: u64) -> Vec<T> {
        let mut due = Vec::new();
        while let Some(entry) = self.queue.peek() {
            if entry.at > now {
                break;
            }
            let entry = self.queue.pop().expect("peeked entry must be present");
            if entry.guard == self.current_guard {
                due.push(entry.payload);
            }
        }
        due
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_time_then_insertion_order() {
        let mut s: Scheduler<&'static str> = Scheduler::new();
        s.schedule_after(0, 10, "b");
        s.schedule_after(0, 5, "a");
        s.schedule_after(0, 10, "c");
        assert_eq!(s.drain_due(4), Vec::<&str>::new());
        assert_eq!(s.drain_due(5), vec!["a"]);
        assert_eq!(s.drain_due(10), vec!["b", "c"]);
    }

    #[test]
    fn invalidate_drops_stale_callbacks() {
        let mut s: Scheduler<&'static str> = Scheduler::new();
        s.schedule_after(0, 5, "stale");
        s.invalidate();
        s.schedule_after(0, 5, "fresh");
        assert_eq!(s.drain_due(10), vec!["fresh"]);
    }
}
