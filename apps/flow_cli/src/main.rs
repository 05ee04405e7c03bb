use std::{io::BufRead, path::PathBuf, thread};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flow_core::{
    drive, signal_channel, Controller, FlowHandle, Navigator, PaymentCommand, PaymentController,
    SplashController, StaticTheme,
};
use shared::{domain::QrImageRef, protocol::NavigationRequest};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod script;

use config::load_settings;
use script::{parse_payment_events, parse_splash_events, spawn_script};

#[derive(Parser, Debug)]
struct Args {
    /// Settings file; defaults to ./flow.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    screen: Screen,
}

#[derive(Subcommand, Debug)]
enum Screen {
    /// Play the intro sequence and land.
    Splash {
        /// `<millis>:unmount`
        #[arg(long = "event")]
        events: Vec<String>,
    },
    /// Show the payment QR and count down.
    Payment {
        /// `<millis>:<paid|failed|cancel|unmount>`
        #[arg(long = "event")]
        events: Vec<String>,
        /// Read paid/failed/cancel/quit lines from stdin.
        #[arg(long)]
        interactive: bool,
    },
}

/// Prints every navigation as one JSON line on stdout.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, request: NavigationRequest) {
        info!(route = %request.route, params = ?request.params, "navigate");
        match serde_json::to_string(&request) {
            Ok(line) => println!("{line}"),
            Err(err) => error!("failed to encode navigation request: {err}"),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    let theme = StaticTheme::new(settings.theme);

    match args.screen {
        Screen::Splash { events } => {
            let events = parse_splash_events(&events)?;
            let (handle, signals) = signal_channel();
            spawn_script(handle.clone(), events);

            let splash = SplashController::new(ConsoleNavigator, theme, settings.splash);
            let splash = drive(splash, signals).await;
            info!(status = ?splash.status(), phase = %splash.phase(), "splash closed");
            drop(handle);
        }
        Screen::Payment {
            events,
            interactive,
        } => {
            let events = parse_payment_events(&events)?;
            let (handle, signals) = signal_channel();
            spawn_script(handle.clone(), events);
            if interactive {
                spawn_stdin_reader(handle.clone());
            }

            let payment = PaymentController::new(
                ConsoleNavigator,
                theme,
                settings.countdown,
                QrImageRef::new(settings.qr_image_uri),
            );
            let payment = drive(payment, signals).await;
            info!(
                status = ?payment.status(),
                outcome = ?payment.outcome(),
                seconds_left = payment.seconds_left(),
                "payment closed"
            );
            drop(handle);
        }
    }

    Ok(())
}

/// Blocking stdin lives on its own thread so an idle terminal never holds up
/// shutdown.
fn spawn_stdin_reader(handle: FlowHandle<PaymentCommand>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let word = line.trim();
            if word.is_empty() {
                continue;
            }

            let sent = if matches!(word, "quit" | "unmount") {
                handle.deactivate()
            } else if let Some(command) = PaymentCommand::parse(word) {
                handle.send(command)
            } else {
                warn!(input = word, "expected paid, failed, cancel or quit");
                continue;
            };
            if sent.is_err() {
                break;
            }
        }
    });
}
