//! Three-phase intro sequence that ends in a single navigation to the landing
//! screen.
//!
//! All phase timers are armed at activation at absolute offsets instead of being
//! chained. Nothing can interrupt the sequence except unmounting, so both
//! layouts behave the same; keep it that way if manual input is ever added.

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{ColorToken, MarkVariant, Phase},
    error::FlowError,
    protocol::{NavigationRequest, Route},
};
use tracing::{debug, info};

use crate::{
    controller::{Controller, ControllerCore, ControllerStatus},
    navigation::Navigator,
    theme::{mark_variant, Color, ThemeProvider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashTimings {
    pub interstitial_at_ms: u64,
    pub reveal_at_ms: u64,
    pub exit_at_ms: u64,
    pub mark_fade_in_ms: u64,
    pub fade_out_ms: u64,
}

impl Default for SplashTimings {
    fn default() -> Self {
        Self {
            interstitial_at_ms: 1_000,
            reveal_at_ms: 2_000,
            exit_at_ms: 5_000,
            mark_fade_in_ms: 600,
            fade_out_ms: 600,
        }
    }
}

impl SplashTimings {
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.interstitial_at_ms == 0 {
            return Err(FlowError::invalid_timing(
                "interstitial offset must be greater than zero",
            ));
        }
        if self.reveal_at_ms <= self.interstitial_at_ms {
            return Err(FlowError::invalid_timing(format!(
                "reveal offset {}ms must come after interstitial offset {}ms",
                self.reveal_at_ms, self.interstitial_at_ms
            )));
        }
        if self.exit_at_ms <= self.reveal_at_ms {
            return Err(FlowError::invalid_timing(format!(
                "exit offset {}ms must come after reveal offset {}ms",
                self.exit_at_ms, self.reveal_at_ms
            )));
        }
        Ok(())
    }

    /// Latest instant the landing navigation can happen, relative to activation.
    pub fn navigation_at_ms(&self) -> u64 {
        self.exit_at_ms.saturating_add(self.fade_out_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplashTimer {
    Enter(Phase),
    BeginExit,
    /// Resolution of the fade-out; the only place the landing navigation runs.
    FadeOutSettled,
}

/// A running opacity animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fade {
    pub started_ms: u64,
    pub duration_ms: u64,
}

impl Fade {
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.started_ms).min(self.duration_ms);
        elapsed as f32 / self.duration_ms as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkView {
    pub variant: MarkVariant,
    pub fade_in: Fade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplashView {
    pub phase: Phase,
    pub background: Color,
    pub mark: Option<MarkView>,
    pub fade_out: Option<Fade>,
}

pub struct SplashController<N, T> {
    core: ControllerCore<SplashTimer>,
    navigator: N,
    theme: T,
    timings: SplashTimings,
    phase: Phase,
    phase_entered_ms: u64,
    fade_out: Option<Fade>,
}

impl<N, T> SplashController<N, T>
where
    N: Navigator,
    T: ThemeProvider,
{
    pub fn new(navigator: N, theme: T, timings: SplashTimings) -> Self {
        Self {
            core: ControllerCore::new("splash"),
            navigator,
            theme,
            timings,
            phase: Phase::Intro,
            phase_entered_ms: 0,
            fade_out: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_fading_out(&self) -> bool {
        self.fade_out.is_some()
    }

    pub fn timings(&self) -> &SplashTimings {
        &self.timings
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }

    pub fn view(&self) -> SplashView {
        let background = match self.phase {
            Phase::Intro => self.theme.color(ColorToken::PrimaryAccent),
            Phase::Interstitial | Phase::Reveal => self.theme.color(ColorToken::Background),
        };
        let mark = (self.phase == Phase::Reveal).then(|| MarkView {
            variant: mark_variant(self.theme.mode()),
            fade_in: Fade {
                started_ms: self.phase_entered_ms,
                duration_ms: self.timings.mark_fade_in_ms,
            },
        });

        SplashView {
            phase: self.phase,
            background,
            mark,
            fade_out: self.fade_out,
        }
    }

    fn on_timer(&mut self, timer: SplashTimer) {
        let now_ms = self.core.now_ms();
        match timer {
            SplashTimer::Enter(phase) => {
                if self.phase.next() != Some(phase) {
                    debug!(%phase, current = %self.phase, "skipping out-of-order phase");
                    return;
                }
                debug!(from = %self.phase, to = %phase, at_ms = now_ms, "splash phase change");
                self.phase = phase;
                self.phase_entered_ms = now_ms;
            }
            SplashTimer::BeginExit => {
                debug!(at_ms = now_ms, duration_ms = self.timings.fade_out_ms, "splash fade-out");
                self.fade_out = Some(Fade {
                    started_ms: now_ms,
                    duration_ms: self.timings.fade_out_ms,
                });
                self.core
                    .arm(self.timings.fade_out_ms, SplashTimer::FadeOutSettled);
            }
            SplashTimer::FadeOutSettled => {
                let navigator = &mut self.navigator;
                let committed = self
                    .core
                    .commit(|| navigator.navigate(NavigationRequest::new(Route::Landing)));
                if committed.is_some() {
                    info!(at_ms = now_ms, route = %Route::Landing, "splash finished");
                }
            }
        }
    }
}

impl<N, T> Controller for SplashController<N, T>
where
    N: Navigator,
    T: ThemeProvider,
{
    type Command = Infallible;

    fn activate(&mut self) {
        if !self.core.activate() {
            return;
        }
        info!(theme = ?self.theme.mode(), "splash mounted");
        self.core.arm(
            self.timings.interstitial_at_ms,
            SplashTimer::Enter(Phase::Interstitial),
        );
        self.core
            .arm(self.timings.reveal_at_ms, SplashTimer::Enter(Phase::Reveal));
        self.core.arm(self.timings.exit_at_ms, SplashTimer::BeginExit);
    }

    fn advance_to(&mut self, now_ms: u64) {
        while let Some(timer) = self.core.next_due(now_ms) {
            self.on_timer(timer);
        }
        self.core.settle(now_ms);
    }

    fn handle(&mut self, command: Self::Command) {
        match command {}
    }

    fn deactivate(&mut self) {
        let canceled = self.core.deactivate();
        info!(phase = %self.phase, canceled, "splash unmounted");
    }

    fn next_deadline(&mut self) -> Option<u64> {
        self.core.next_deadline()
    }

    fn status(&self) -> ControllerStatus {
        self.core.status()
    }
}

#[cfg(test)]
#[path = "tests/splash_tests.rs"]
mod tests;
