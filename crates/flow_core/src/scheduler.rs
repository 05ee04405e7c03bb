//! Single-shot, cancelable timers on a virtual millisecond clock.
//!
//! A timer carries a typed event instead of a boxed closure: when it fires the
//! scheduler hands the event back to whoever owns the scheduler, which then
//! runs its own handler. Timers sharing a deadline fire in the order they were
//! scheduled.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

use shared::domain::TimerId;

/// Handle to a pending timer. Deliberately neither `Clone` nor `Copy`: only the
/// owner that scheduled the timer can cancel it.
#[derive(Debug, PartialEq, Eq)]
pub struct TimerHandle {
    id: TimerId,
    deadline_ms: u64,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }
}

/// A timer popped off the queue because its deadline was reached.
#[derive(Debug, PartialEq, Eq)]
pub struct FiredTimer<E> {
    pub id: TimerId,
    pub deadline_ms: u64,
    pub event: E,
}

#[derive(Debug)]
pub struct TimerScheduler<E> {
    now_ms: u64,
    next_id: u64,
    queue: BinaryHeap<Reverse<(u64, u64)>>,
    pending: HashMap<u64, E>,
}

impl<E> Default for TimerScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> TimerScheduler<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            queue: BinaryHeap::new(),
            pending: HashMap::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Arms a timer that delivers `event` once, `delay_ms` after the current
    /// clock reading.
    pub fn schedule(&mut self, delay_ms: u64, event: E) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        let deadline_ms = self.now_ms.saturating_add(delay_ms);

        // Ids grow monotonically, so (deadline, id) orders ties by scheduling order.
        self.queue.push(Reverse((deadline_ms, id)));
        self.pending.insert(id, event);

        TimerHandle {
            id: TimerId(id),
            deadline_ms,
        }
    }

    /// Returns `true` if the timer was still pending. Canceling a fired or
    /// already-canceled timer is a no-op.
    pub fn cancel(&mut self, handle: &TimerHandle) -> bool {
        self.pending.remove(&handle.id.0).is_some()
    }

    pub fn is_pending(&self, handle: &TimerHandle) -> bool {
        self.pending.contains_key(&handle.id.0)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn next_deadline(&mut self) -> Option<u64> {
        self.discard_canceled_head();
        self.queue.peek().map(|Reverse((deadline, _))| *deadline)
    }

    /// Pops the earliest timer due at or before `until_ms`. The clock is moved
    /// to that timer's deadline so anything scheduled by its handler is
    /// measured from the instant it fired.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<FiredTimer<E>> {
        self.discard_canceled_head();
        let Reverse((deadline_ms, id)) = *self.queue.peek()?;
        if deadline_ms > until_ms {
            return None;
        }

        self.queue.pop();
        let event = self.pending.remove(&id)?;
        self.now_ms = self.now_ms.max(deadline_ms);
        Some(FiredTimer {
            id: TimerId(id),
            deadline_ms,
            event,
        })
    }

    /// Moves the clock forward without firing anything. Call after draining
    /// `pop_due` for the same instant.
    pub fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn discard_canceled_head(&mut self) {
        while let Some(Reverse((_, id))) = self.queue.peek() {
            if self.pending.contains_key(id) {
                break;
            }
            self.queue.pop();
        }
    }
}

#[cfg(test)]
#[path = "tests/scheduler_tests.rs"]
mod tests;
