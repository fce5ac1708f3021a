//! Delay queue keyed on game time.
//!
//! Gameplay effects that land a little after their trigger (chain reactions,
//! lightning strikes, charged shots) are pushed here and drained by the game
//! loop once game time reaches their due time. Tasks due at the same instant
//! come out in the order they were scheduled.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug)]
struct Slot<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Slot<T> {}

impl<T> PartialOrd for Slot<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Slot<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Min-heap of tasks ordered by (due time, insertion order).
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Reverse<Slot<T>>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `task` to run once game time reaches `due`.
    pub fn schedule_at(&mut self, due: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Slot { due, seq, task }));
    }

    /// Schedule `task` to run `delay` after `now`.
    pub fn schedule_in(&mut self, now: Duration, delay: Duration, task: T) {
        self.schedule_at(now + delay, task);
    }

    /// Pop the next task whose due time is at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<T> {
        let ready = matches!(self.queue.peek(), Some(Reverse(slot)) if slot.due <= now);
        if ready {
            self.queue.pop().map(|Reverse(slot)| slot.task)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Cancel everything pending.
    pub fn clear(&mut self) {
        if !self.queue.is_empty() {
            log::debug!("Cancelling {} scheduled tasks", self.queue.len());
        }
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn due<T>(s: &mut Scheduler<T>, now: Duration) -> Vec<T> {
        std::iter::from_fn(|| s.pop_due(now)).collect()
    }

    #[test]
    fn tasks_never_fire_before_due() {
        let mut s = Scheduler::new();
        s.schedule_in(ms(100), ms(200), "late");
        assert!(due(&mut s, ms(299)).is_empty());
        assert_eq!(due(&mut s, ms(300)), vec!["late"]);
        assert!(s.is_empty());
    }

    #[test]
    fn due_tasks_come_out_by_time_then_insertion() {
        let mut s = Scheduler::new();
        s.schedule_at(ms(50), 3);
        s.schedule_at(ms(10), 1);
        s.schedule_at(ms(50), 4);
        s.schedule_at(ms(10), 2);
        s.schedule_at(ms(90), 5);
        assert_eq!(due(&mut s, ms(60)), vec![1, 2, 3, 4]);
        assert_eq!(s.len(), 1);
        assert_eq!(due(&mut s, ms(90)), vec![5]);
    }

    #[test]
    fn clear_cancels_pending() {
        let mut s = Scheduler::new();
        s.schedule_at(ms(1), ());
        s.clear();
        assert_eq!(s.len(), 0);
        assert!(s.pop_due(ms(1000)).is_none());
    }
}
