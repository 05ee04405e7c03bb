//! Payment QR countdown: ticks down once per period toward an automatic
//! timeout, unless the user confirms, reports a failure, or backs out first.
//!
//! Each tick decrements first and then checks for zero, so with the default
//! 30 second budget the timeout navigation happens exactly 30 ticks after
//! activation and the last value rendered before it is 1.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{ColorToken, FailureReason, PaymentMethod, QrImageRef, TerminalOutcome},
    error::FlowError,
    protocol::{NavigationRequest, Route},
};
use tracing::{debug, info};

use crate::{
    controller::{Controller, ControllerCore, ControllerStatus},
    navigation::Navigator,
    theme::{Color, ThemeProvider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    pub seconds: u32,
    pub tick_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            seconds: 30,
            tick_ms: 1_000,
        }
    }
}

impl CountdownConfig {
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.seconds == 0 {
            return Err(FlowError::invalid_timing("countdown must start above zero"));
        }
        if self.tick_ms == 0 {
            return Err(FlowError::invalid_timing("tick period must be greater than zero"));
        }
        Ok(())
    }

    pub fn timeout_at_ms(&self) -> u64 {
        u64::from(self.seconds).saturating_mul(self.tick_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaymentTimer {
    Tick,
}

/// Manual events raised by the payment screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentCommand {
    ConfirmPaid,
    ReportFailed,
    Cancel,
}

impl PaymentCommand {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "paid" | "confirm" | "confirm_paid" => Some(Self::ConfirmPaid),
            "failed" | "fail" | "report_failed" => Some(Self::ReportFailed),
            "cancel" | "back" => Some(Self::Cancel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentView {
    pub seconds_left: u32,
    pub qr_image: QrImageRef,
    pub accent: Color,
    pub outcome: Option<TerminalOutcome>,
}

pub struct PaymentController<N, T> {
    core: ControllerCore<PaymentTimer>,
    navigator: N,
    theme: T,
    config: CountdownConfig,
    qr_image: QrImageRef,
    method: PaymentMethod,
    seconds_left: u32,
    outcome: Option<TerminalOutcome>,
}

impl<N, T> PaymentController<N, T>
where
    N: Navigator,
    T: ThemeProvider,
{
    pub fn new(navigator: N, theme: T, config: CountdownConfig, qr_image: QrImageRef) -> Self {
        Self {
            core: ControllerCore::new("payment"),
            navigator,
            theme,
            config,
            qr_image,
            method: PaymentMethod::Upi,
            seconds_left: config.seconds,
            outcome: None,
        }
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    /// Countdown value as rendered. The counter never goes negative, so this
    /// is the raw value.
    pub fn display_seconds(&self) -> u32 {
        self.seconds_left
    }

    pub fn outcome(&self) -> Option<TerminalOutcome> {
        self.outcome
    }

    pub fn qr_image(&self) -> &QrImageRef {
        &self.qr_image
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }

    pub fn view(&self) -> PaymentView {
        PaymentView {
            seconds_left: self.display_seconds(),
            qr_image: self.qr_image.clone(),
            accent: self.theme.color(ColorToken::PrimaryAccent),
            outcome: self.outcome,
        }
    }

    pub fn confirm_paid(&mut self) {
        self.finish(TerminalOutcome::ManualSuccess {
            method: self.method,
        });
    }

    pub fn report_failed(&mut self) {
        self.finish(TerminalOutcome::ManualFailure {
            reason: FailureReason::Reported,
        });
    }

    pub fn cancel(&mut self) {
        self.finish(TerminalOutcome::ManualFailure {
            reason: FailureReason::Cancelled,
        });
    }

    fn on_timer(&mut self, timer: PaymentTimer) {
        match timer {
            PaymentTimer::Tick => {
                self.seconds_left = self.seconds_left.saturating_sub(1);
                debug!(
                    seconds_left = self.seconds_left,
                    at_ms = self.core.now_ms(),
                    "countdown tick"
                );
                if self.seconds_left == 0 {
                    self.finish(TerminalOutcome::Timeout);
                } else {
                    self.core.arm(self.config.tick_ms, PaymentTimer::Tick);
                }
            }
        }
    }

    fn finish(&mut self, outcome: TerminalOutcome) {
        let request = match outcome {
            TerminalOutcome::Timeout => NavigationRequest::new(Route::PaymentFailed),
            TerminalOutcome::ManualSuccess { method } => {
                NavigationRequest::payment_success(method)
            }
            TerminalOutcome::ManualFailure {
                reason: FailureReason::Reported,
            } => NavigationRequest::new(Route::PaymentFailed),
            TerminalOutcome::ManualFailure {
                reason: FailureReason::Cancelled,
            } => NavigationRequest::new(Route::PaymentEntry),
        };
        let route = request.route;

        let navigator = &mut self.navigator;
        if self.core.commit(|| navigator.navigate(request)).is_none() {
            debug!(
                ?outcome,
                status = ?self.core.status(),
                "ignoring terminal event on settled payment"
            );
            return;
        }

        self.outcome = Some(outcome);
        info!(
            ?outcome,
            %route,
            seconds_left = self.seconds_left,
            "payment flow settled"
        );
    }
}

impl<N, T> Controller for PaymentController<N, T>
where
    N: Navigator,
    T: ThemeProvider,
{
    type Command = PaymentCommand;

    fn activate(&mut self) {
        if !self.core.activate() {
            return;
        }
        info!(
            seconds = self.config.seconds,
            tick_ms = self.config.tick_ms,
            qr = self.qr_image.as_str(),
            "payment countdown mounted"
        );
        self.core.arm(self.config.tick_ms, PaymentTimer::Tick);
    }

    fn advance_to(&mut self, now_ms: u64) {
        while let Some(timer) = self.core.next_due(now_ms) {
            self.on_timer(timer);
        }
        self.core.settle(now_ms);
    }

    fn handle(&mut self, command: Self::Command) {
        match command {
            PaymentCommand::ConfirmPaid => self.confirm_paid(),
            PaymentCommand::ReportFailed => self.report_failed(),
            PaymentCommand::Cancel => self.cancel(),
        }
    }

    fn deactivate(&mut self) {
        let canceled = self.core.deactivate();
        info!(seconds_left = self.seconds_left, canceled, "payment countdown unmounted");
    }

    fn next_deadline(&mut self) -> Option<u64> {
        self.core.next_deadline()
    }

    fn status(&self) -> ControllerStatus {
        self.core.status()
    }
}

#[cfg(test)]
#[path = "tests/payment_tests.rs"]
mod tests;
