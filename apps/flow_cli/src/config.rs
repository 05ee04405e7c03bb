use std::{
    fs, io,
    path::{Path, PathBuf},
};

use flow_core::{CountdownConfig, SplashTimings};
use serde::Deserialize;
use shared::{domain::ThemeMode, error::FlowError};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "flow.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemeMode,
    pub qr_image_uri: String,
    pub splash: SplashTimings,
    pub countdown: CountdownConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::Light,
            qr_image_uri: "asset://payment/upi-qr.png".into(),
            splash: SplashTimings::default(),
            countdown: CountdownConfig::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.splash.validate()?;
        self.countdown.validate()?;
        if self.qr_image_uri.trim().is_empty() {
            return Err(ConfigError::Invalid(FlowError::new(
                shared::error::ErrorCode::InvalidConfig,
                "qr_image_uri must not be empty",
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },
    #[error(transparent)]
    Invalid(#[from] FlowError),
}

/// Defaults, then `path` (or `flow.toml` in the working directory if present),
/// then `APP__*` environment variables.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Settings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    settings.validate()?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(v) = lookup("APP__THEME") {
        settings.theme = ThemeMode::parse(&v).ok_or_else(|| ConfigError::InvalidEnv {
            key: "APP__THEME",
            value: v.clone(),
        })?;
    }
    if let Some(v) = lookup("APP__QR_IMAGE_URI") {
        settings.qr_image_uri = v;
    }

    if let Some(v) = lookup("APP__COUNTDOWN_SECONDS") {
        settings.countdown.seconds = parse_number("APP__COUNTDOWN_SECONDS", v)?;
    }
    if let Some(v) = lookup("APP__TICK_MS") {
        settings.countdown.tick_ms = parse_number("APP__TICK_MS", v)?;
    }

    if let Some(v) = lookup("APP__SPLASH_INTERSTITIAL_MS") {
        settings.splash.interstitial_at_ms = parse_number("APP__SPLASH_INTERSTITIAL_MS", v)?;
    }
    if let Some(v) = lookup("APP__SPLASH_REVEAL_MS") {
        settings.splash.reveal_at_ms = parse_number("APP__SPLASH_REVEAL_MS", v)?;
    }
    if let Some(v) = lookup("APP__SPLASH_EXIT_MS") {
        settings.splash.exit_at_ms = parse_number("APP__SPLASH_EXIT_MS", v)?;
    }
    if let Some(v) = lookup("APP__SPLASH_FADE_IN_MS") {
        settings.splash.mark_fade_in_ms = parse_number("APP__SPLASH_FADE_IN_MS", v)?;
    }
    if let Some(v) = lookup("APP__SPLASH_FADE_OUT_MS") {
        settings.splash.fade_out_ms = parse_number("APP__SPLASH_FADE_OUT_MS", v)?;
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { key, value })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
