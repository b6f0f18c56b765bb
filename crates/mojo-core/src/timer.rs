#![forbid(unsafe_code)]

//! Deadline-ordered single-shot timers with cancellation handles.
//!
//! [`TimerQueue`] is the host timer facility the gesture core schedules its
//! continuations on (hold timeout, highlight delay, tap flash). Nothing runs
//! on its own: the host calls [`TimerQueue::pop_due`] (usually through a
//! `tick(now)` entry point) and handles each due payload in turn.
//!
//! # Invariants
//!
//! 1. Due timers pop in deadline order; equal deadlines pop in scheduling order.
//! 2. A cancelled timer never pops.
//! 3. Handles are never reused within one queue.
//!
//! Popping one timer at a time lets a handler schedule or cancel other timers
//! before the next due timer is considered.

use std::collections::BTreeMap;

use ahash::AHashMap;
use web_time::{Duration, Instant};

/// Cancellation handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Single-shot timers carrying a payload of type `T`.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_id: u64,
    entries: BTreeMap<(Instant, u64), T>,
    deadlines: AHashMap<u64, Instant>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entries: BTreeMap::new(),
            deadlines: AHashMap::new(),
        }
    }

    /// Schedule `payload` to become due at `deadline`.
    pub fn schedule(&mut self, deadline: Instant, payload: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert((deadline, id), payload);
        self.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    /// Schedule `payload` to become due `delay` after `now`.
    pub fn schedule_after(&mut self, now: Instant, delay: Duration, payload: T) -> TimerHandle {
        self.schedule(now + delay, payload)
    }

    /// Cancel a timer, returning its payload if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        let deadline = self.deadlines.remove(&handle.0)?;
        self.entries.remove(&(deadline, handle.0))
    }

    /// Whether the timer is still pending.
    #[must_use]
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle.0)
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<(TimerHandle, T)> {
        let (&(deadline, id), _) = self.entries.iter().next()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&id);
        let payload = self.entries.remove(&(deadline, id))?;
        Some((TimerHandle(id), payload))
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);
    const MS_200: Duration = Duration::from_millis(200);

    #[test]
    fn pops_in_deadline_order() {
        let t = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule_after(t, MS_200, "late");
        q.schedule_after(t, MS_100, "early");
        assert_eq!(q.next_deadline(), Some(t + MS_100));

        assert!(q.pop_due(t).is_none());
        assert_eq!(q.pop_due(t + MS_200).map(|(_, p)| p), Some("early"));
        assert_eq!(q.pop_due(t + MS_200).map(|(_, p)| p), Some("late"));
        assert!(q.is_empty());
    }

    #[test]
    fn equal_deadlines_keep_schedule_order() {
        let t = Instant::now();
        let mut q = TimerQueue::new();
        q.schedule(t, 1);
        q.schedule(t, 2);
        q.schedule(t, 3);
        let order: Vec<_> = std::iter::from_fn(|| q.pop_due(t).map(|(_, p)| p)).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn cancelled_timer_never_pops() {
        let t = Instant::now();
        let mut q = TimerQueue::new();
        let h = q.schedule_after(t, MS_100, 'a');
        assert!(q.is_pending(h));
        assert_eq!(q.cancel(h), Some('a'));
        assert!(!q.is_pending(h));
        assert_eq!(q.cancel(h), None);
        assert!(q.pop_due(t + MS_200).is_none());
    }

    #[test]
    fn handles_are_unique() {
        let t = Instant::now();
        let mut q = TimerQueue::new();
        let a = q.schedule(t, ());
        let _ = q.pop_due(t);
        let b = q.schedule(t, ());
        assert_ne!(a, b);
    }

    #[test]
    fn clear_drops_everything() {
        let t = Instant::now();
        let mut q = TimerQueue::new();
        let h = q.schedule(t, 0u8);
        q.clear();
        assert!(!q.is_pending(h));
        assert_eq!(q.len(), 0);
        assert_eq!(q.next_deadline(), None);
    }
}
