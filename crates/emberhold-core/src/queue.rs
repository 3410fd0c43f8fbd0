//! The generic timed-task queue.
//!
//! An entry, once enqueued, carries a **fixed** resolution time computed
//! from the discount state at enqueue time; later discount changes never
//! retroactively alter an in-flight entry. Resolution happens exactly once,
//! at the first tick with `now >= resolves_at`, and destroys the entry.
//!
//! The engine instantiates this three ways: forging ([`crate::crafting`]),
//! brewing ([`crate::brewing`]), and expeditions ([`crate::missions`]).

use crate::id::EntryId;
use crate::ledger::Ticks;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// A live queue entry. Created on enqueue, removed on resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry<P> {
    pub payload: P,
    pub enqueued_at: Ticks,
    /// `enqueued_at + duration`, never recomputed.
    pub resolves_at: Ticks,
    /// Duration captured at enqueue time.
    pub duration: Ticks,
}

/// A timed task queue over one payload type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQueue<P> {
    entries: SlotMap<EntryId, QueueEntry<P>>,
}

impl<P> TaskQueue<P> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry resolving at `now + duration` (at least one tick out).
    pub fn enqueue(&mut self, payload: P, now: Ticks, duration: Ticks) -> EntryId {
        let duration = duration.max(1);
        self.entries.insert(QueueEntry {
            payload,
            enqueued_at: now,
            resolves_at: now + duration,
            duration,
        })
    }

    /// Remove and return every due entry, ordered by resolution time then
    /// insertion key so resolution order is deterministic.
    pub fn take_due(&mut self, now: Ticks) -> Vec<(EntryId, QueueEntry<P>)> {
        let mut due: Vec<EntryId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.resolves_at <= now)
            .map(|(id, _)| id)
            .collect();
        due.sort_by_key(|&id| (self.entries[id].resolves_at, id));
        due.into_iter()
            .filter_map(|id| self.entries.remove(id).map(|e| (id, e)))
            .collect()
    }

    /// Read-only view of the live entries, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &QueueEntry<P>)> {
        self.entries.iter()
    }

    /// Whether any live entry satisfies the predicate.
    pub fn any(&self, mut pred: impl FnMut(&P) -> bool) -> bool {
        self.entries.values().any(|e| pred(&e.payload))
    }
}

impl<P> Default for TaskQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_resolves_at_fixed_time() {
        let mut q = TaskQueue::new();
        q.enqueue("a", 100, 50);
        assert!(q.take_due(149).is_empty());
        let due = q.take_due(150);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1.resolves_at, 150);
        assert!(q.is_empty());
    }

    #[test]
    fn resolution_happens_exactly_once() {
        let mut q = TaskQueue::new();
        q.enqueue("a", 0, 10);
        assert_eq!(q.take_due(10).len(), 1);
        assert!(q.take_due(10).is_empty());
        assert!(q.take_due(100).is_empty());
    }

    #[test]
    fn due_entries_come_out_in_resolution_order() {
        let mut q = TaskQueue::new();
        q.enqueue("slow", 0, 30);
        q.enqueue("fast", 0, 10);
        q.enqueue("mid", 0, 20);
        let due = q.take_due(30);
        let order: Vec<&str> = due.iter().map(|(_, e)| e.payload).collect();
        assert_eq!(order, vec!["fast", "mid", "slow"]);
    }

    #[test]
    fn zero_duration_is_bumped_to_one_tick() {
        let mut q = TaskQueue::new();
        q.enqueue("a", 5, 0);
        assert!(q.take_due(5).is_empty());
        assert_eq!(q.take_due(6).len(), 1);
    }

    #[test]
    fn any_matches_live_payloads() {
        let mut q = TaskQueue::new();
        q.enqueue(3u32, 0, 10);
        assert!(q.any(|&p| p == 3));
        assert!(!q.any(|&p| p == 4));
    }
}
