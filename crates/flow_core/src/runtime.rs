//! Real-time driver: runs a controller against the tokio clock and a channel of
//! manual signals on the current task.

use std::future;

use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{self, Duration, Instant},
};
use tracing::{debug, info};

use crate::controller::Controller;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal<C> {
    Command(C),
    /// Unmount the screen.
    Deactivate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("controller is no longer running")]
    Closed,
}

/// Sending side handed to whatever produces manual events.
#[derive(Debug)]
pub struct FlowHandle<C> {
    tx: mpsc::UnboundedSender<Signal<C>>,
}

impl<C> Clone for FlowHandle<C> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<C> FlowHandle<C> {
    pub fn send(&self, command: C) -> Result<(), SignalError> {
        self.tx
            .send(Signal::Command(command))
            .map_err(|_| SignalError::Closed)
    }

    pub fn deactivate(&self) -> Result<(), SignalError> {
        self.tx
            .send(Signal::Deactivate)
            .map_err(|_| SignalError::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub type SignalReceiver<C> = mpsc::UnboundedReceiver<Signal<C>>;

pub fn signal_channel<C>() -> (FlowHandle<C>, SignalReceiver<C>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (FlowHandle { tx }, rx)
}

/// Activates `controller` and feeds it timer deadlines and signals until it
/// finishes or is unmounted, then hands it back. Dropping every
/// [`FlowHandle`] counts as an unmount.
///
/// Timers that are due when a signal arrives are delivered before the signal.
pub async fn drive<C>(mut controller: C, mut signals: SignalReceiver<C::Command>) -> C
where
    C: Controller,
{
    let started = Instant::now();
    controller.activate();

    while !controller.status().is_stopped() {
        let deadline_ms = controller.next_deadline();
        let wake = async move {
            match deadline_ms {
                Some(at_ms) => time::sleep_until(started + Duration::from_millis(at_ms)).await,
                None => future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = wake => {
                // The sleep may end a hair before the millisecond boundary.
                let now_ms = elapsed_ms(started).max(deadline_ms.unwrap_or_default());
                controller.advance_to(now_ms);
            }
            signal = signals.recv() => {
                controller.advance_to(elapsed_ms(started));
                match signal {
                    Some(Signal::Command(command)) => {
                        debug!(?command, at_ms = elapsed_ms(started), "manual signal");
                        controller.handle(command);
                    }
                    Some(Signal::Deactivate) | None => {
                        controller.deactivate();
                        break;
                    }
                }
            }
        }
    }

    info!(status = ?controller.status(), at_ms = elapsed_ms(started), "controller stopped");
    controller
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
