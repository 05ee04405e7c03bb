//! Shared plumbing for timed screen controllers: an owned scheduler, the set of
//! handles it has armed, and the guard that lets exactly one terminal action
//! through.

use std::fmt;

use tracing::debug;

use crate::{
    guard::TransitionGuard,
    scheduler::{TimerHandle, TimerScheduler},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    /// Constructed but not mounted yet.
    Idle,
    Active,
    /// A terminal action committed.
    Finished,
    /// Unmounted before any terminal action.
    Deactivated,
}

impl ControllerStatus {
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Finished | Self::Deactivated)
    }
}

/// A screen controller as seen by a driver loop. Times are milliseconds since
/// activation; clock advances before `activate` are ignored.
pub trait Controller {
    type Command: fmt::Debug;

    fn activate(&mut self);
    fn advance_to(&mut self, now_ms: u64);
    fn handle(&mut self, command: Self::Command);
    fn deactivate(&mut self);
    fn next_deadline(&mut self) -> Option<u64>;
    fn status(&self) -> ControllerStatus;
}

#[derive(Debug)]
pub struct ControllerCore<E> {
    name: &'static str,
    scheduler: TimerScheduler<E>,
    armed: Vec<TimerHandle>,
    guard: TransitionGuard,
    status: ControllerStatus,
}

impl<E: fmt::Debug> ControllerCore<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            scheduler: TimerScheduler::new(),
            armed: Vec::new(),
            guard: TransitionGuard::new(),
            status: ControllerStatus::Idle,
        }
    }

    pub fn status(&self) -> ControllerStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ControllerStatus::Active
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Idle -> Active. Returns `false` if the controller was mounted before.
    pub fn activate(&mut self) -> bool {
        if self.status != ControllerStatus::Idle {
            debug!(controller = self.name, status = ?self.status, "ignoring repeated activation");
            return false;
        }
        self.status = ControllerStatus::Active;
        true
    }

    pub fn arm(&mut self, delay_ms: u64, event: E) {
        if !self.is_active() {
            debug!(controller = self.name, ?event, "not arming timer on inactive controller");
            return;
        }
        let handle = self.scheduler.schedule(delay_ms, event);
        debug!(
            controller = self.name,
            timer = %handle.id(),
            deadline_ms = handle.deadline_ms(),
            "armed timer"
        );
        self.armed.push(handle);
    }

    /// Next timer event due at or before `until_ms`, if the controller is
    /// still live.
    pub fn next_due(&mut self, until_ms: u64) -> Option<E> {
        if !self.is_active() {
            return None;
        }
        let fired = self.scheduler.pop_due(until_ms)?;
        self.armed.retain(|handle| handle.id() != fired.id);
        debug!(
            controller = self.name,
            timer = %fired.id,
            at_ms = fired.deadline_ms,
            "timer fired"
        );
        Some(fired.event)
    }

    /// The clock only runs once mounted, so offsets stay relative to
    /// activation.
    pub fn settle(&mut self, now_ms: u64) {
        if self.status == ControllerStatus::Idle {
            return;
        }
        self.scheduler.settle(now_ms);
    }

    pub fn next_deadline(&mut self) -> Option<u64> {
        if !self.is_active() {
            return None;
        }
        self.scheduler.next_deadline()
    }

    /// Runs `action` if this is the first terminal transition of an active
    /// controller. Every armed timer is canceled before `action` runs.
    pub fn commit<R>(&mut self, action: impl FnOnce() -> R) -> Option<R> {
        if !self.is_active() {
            return None;
        }
        let Self {
            name,
            scheduler,
            armed,
            guard,
            status,
        } = self;
        guard.fire_once(|| {
            let canceled = cancel_all(scheduler, armed);
            *status = ControllerStatus::Finished;
            debug!(controller = *name, canceled, "terminal transition committed");
            action()
        })
    }

    /// Unmount. Cancels every armed timer synchronously; returns how many were
    /// still pending.
    pub fn deactivate(&mut self) -> usize {
        let canceled = cancel_all(&mut self.scheduler, &mut self.armed);
        if self.status != ControllerStatus::Finished {
            self.status = ControllerStatus::Deactivated;
        }
        debug!(controller = self.name, canceled, "deactivated");
        canceled
    }
}

fn cancel_all<E>(scheduler: &mut TimerScheduler<E>, armed: &mut Vec<TimerHandle>) -> usize {
    armed
        .drain(..)
        .filter(|handle| scheduler.cancel(handle))
        .count()
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
