//! Timed manual events given on the command line, e.g. `--event 5000:paid`.

use std::time::Duration;

use flow_core::{FlowHandle, PaymentCommand};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction<C> {
    Command(C),
    Unmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptedEvent<C> {
    pub at: Duration,
    pub action: ScriptAction<C>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("event '{0}' must look like <millis>:<action>")]
    Malformed(String),
    #[error("invalid time in event '{0}'")]
    InvalidTime(String),
    #[error("unknown action '{action}' in event '{raw}'")]
    UnknownAction { raw: String, action: String },
}

pub fn parse_event<C>(
    raw: &str,
    parse_command: impl Fn(&str) -> Option<C>,
) -> Result<ScriptedEvent<C>, ScriptError> {
    let (at, action) = raw
        .split_once(':')
        .ok_or_else(|| ScriptError::Malformed(raw.to_string()))?;
    let at_ms: u64 = at
        .trim()
        .parse()
        .map_err(|_| ScriptError::InvalidTime(raw.to_string()))?;

    let action = match action.trim().to_ascii_lowercase().as_str() {
        "unmount" | "quit" => ScriptAction::Unmount,
        other => parse_command(other).map(ScriptAction::Command).ok_or_else(|| {
            ScriptError::UnknownAction {
                raw: raw.to_string(),
                action: other.to_string(),
            }
        })?,
    };

    Ok(ScriptedEvent {
        at: Duration::from_millis(at_ms),
        action,
    })
}

pub fn parse_payment_events(raw: &[String]) -> Result<Vec<ScriptedEvent<PaymentCommand>>, ScriptError> {
    raw.iter()
        .map(|event| parse_event(event, PaymentCommand::parse))
        .collect()
}

/// The splash screen only understands unmounting.
pub fn parse_splash_events(
    raw: &[String],
) -> Result<Vec<ScriptedEvent<std::convert::Infallible>>, ScriptError> {
    raw.iter()
        .map(|event| parse_event(event, |_| None))
        .collect()
}

/// Replays `events` against `handle`, each at its offset from now.
pub fn spawn_script<C>(handle: FlowHandle<C>, mut events: Vec<ScriptedEvent<C>>)
where
    C: Send + 'static,
{
    events.sort_by_key(|event| event.at);
    tokio::spawn(async move {
        let started = tokio::time::Instant::now();
        for event in events {
            tokio::time::sleep_until(started + event.at).await;
            let sent = match event.action {
                ScriptAction::Command(command) => handle.send(command),
                ScriptAction::Unmount => handle.deactivate(),
            };
            if sent.is_err() {
                let at_ms = u64::try_from(event.at.as_millis()).unwrap_or(u64::MAX);
                warn!(at_ms, "screen already closed; dropping scripted event");
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use flow_core::{
        drive, signal_channel, Controller, ControllerStatus, CountdownConfig, PaymentController,
        RecordingNavigator, StaticTheme,
    };
    use shared::{domain::QrImageRef, protocol::Route};

    use super::*;

    fn payment(navigator: &RecordingNavigator) -> PaymentController<RecordingNavigator, StaticTheme> {
        PaymentController::new(
            navigator.clone(),
            StaticTheme::default(),
            CountdownConfig::default(),
            QrImageRef::default(),
        )
    }

    #[test]
    fn parses_payment_event() {
        let event = parse_event("5000:paid", PaymentCommand::parse).expect("event");
        assert_eq!(event.at, Duration::from_secs(5));
        assert_eq!(event.action, ScriptAction::Command(PaymentCommand::ConfirmPaid));
    }

    #[test]
    fn parses_unmount() {
        let events = parse_splash_events(&["500:unmount".to_string()]).expect("events");
        assert_eq!(events[0].action, ScriptAction::Unmount);
    }

    #[test]
    fn splash_rejects_payment_actions() {
        let err = parse_splash_events(&["500:paid".to_string()]).expect_err("no commands");
        assert_eq!(
            err,
            ScriptError::UnknownAction {
                raw: "500:paid".into(),
                action: "paid".into()
            }
        );
    }

    #[test]
    fn rejects_malformed_events() {
        assert_eq!(
            parse_event("paid", PaymentCommand::parse),
            Err(ScriptError::Malformed("paid".into()))
        );
        assert_eq!(
            parse_event("soon:paid", PaymentCommand::parse),
            Err(ScriptError::InvalidTime("soon:paid".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn scripted_confirm_reaches_payment_screen() {
        let navigator = RecordingNavigator::new();
        let (handle, signals) = signal_channel();
        let events = parse_payment_events(&["5000:paid".to_string()]).expect("events");

        spawn_script(handle, events);
        let payment = drive(payment(&navigator), signals).await;

        assert_eq!(payment.status(), ControllerStatus::Finished);
        assert_eq!(payment.seconds_left(), 25);
        let requests = navigator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].route, Route::PaymentSuccess);
    }

    #[tokio::test(start_paused = true)]
    async fn replays_events_in_time_order() {
        let navigator = RecordingNavigator::new();
        let (handle, signals) = signal_channel();
        let events =
            parse_payment_events(&["9000:cancel".to_string(), "5000:paid".to_string()]).expect("events");

        spawn_script(handle, events);
        let _payment = drive(payment(&navigator), signals).await;

        assert_eq!(navigator.count(), 1);
        assert_eq!(navigator.last().map(|request| request.route), Some(Route::PaymentSuccess));
    }
}
