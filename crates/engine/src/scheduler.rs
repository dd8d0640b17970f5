//! Deadline scheduler on the tick timeline.
//!
//! Each key holds at most one pending deadline. Scheduling a key that is
//! already pending replaces its deadline, so re-arming restarts a timer
//! rather than stacking a second one.

use std::collections::BTreeMap;

use handsign_common::clock::TimestampNs;

/// Single-threaded scheduler of keyed deadlines.
#[derive(Debug, Clone)]
pub struct TickScheduler<K: Ord + Copy> {
    deadlines: BTreeMap<K, TimestampNs>,
}

impl<K: Ord + Copy> Default for TickScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy> TickScheduler<K> {
    pub fn new() -> Self {
        Self {
            deadlines: BTreeMap::new(),
        }
    }

    /// Schedule `key` to fire at `deadline`, returning the deadline it replaced.
    pub fn schedule(&mut self, key: K, deadline: TimestampNs) -> Option<TimestampNs> {
        self.deadlines.insert(key, deadline)
    }

    /// Cancel a pending deadline. Returns whether one was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    pub fn deadline(&self, key: K) -> Option<TimestampNs> {
        self.deadlines.get(&key).copied()
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.deadlines.contains_key(&key)
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest deadline first (ties broken by key order).
    pub fn expire(&mut self, now: TimestampNs) -> Vec<K> {
        let mut due: Vec<(TimestampNs, K)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (*deadline, *key))
            .collect();
        if due.is_empty() {
            return Vec::new();
        }
        due.sort();
        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<TimestampNs> {
        self.deadlines.values().min().copied()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
