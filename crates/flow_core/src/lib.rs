//! Timed screen-flow controllers: the splash intro sequence and the payment QR
//! countdown, built on a cancelable single-shot scheduler and a first-wins
//! transition guard.

pub mod controller;
pub mod guard;
pub mod navigation;
pub mod payment;
pub mod runtime;
pub mod scheduler;
pub mod splash;
pub mod theme;

pub use controller::{Controller, ControllerCore, ControllerStatus};
pub use guard::TransitionGuard;
pub use navigation::{Navigator, RecordingNavigator};
pub use payment::{CountdownConfig, PaymentCommand, PaymentController, PaymentView};
pub use runtime::{drive, signal_channel, FlowHandle, Signal, SignalError};
pub use scheduler::{TimerHandle, TimerScheduler};
pub use splash::{SplashController, SplashTimings, SplashView};
pub use theme::{Color, StaticTheme, ThemeProvider};
