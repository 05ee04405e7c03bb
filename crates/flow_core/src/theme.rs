use std::fmt;

use serde::{Deserialize, Serialize};
use shared::domain::{ColorToken, MarkVariant, ThemeMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Read-only theme lookup handed to a controller when it is built.
pub trait ThemeProvider {
    fn mode(&self) -> ThemeMode;
    fn color(&self, token: ColorToken) -> Color;
}

impl<T: ThemeProvider + ?Sized> ThemeProvider for &T {
    fn mode(&self) -> ThemeMode {
        (**self).mode()
    }

    fn color(&self, token: ColorToken) -> Color {
        (**self).color(token)
    }
}

/// Built-in light and dark palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaticTheme {
    mode: ThemeMode,
}

impl StaticTheme {
    pub fn new(mode: ThemeMode) -> Self {
        Self { mode }
    }
}

impl ThemeProvider for StaticTheme {
    fn mode(&self) -> ThemeMode {
        self.mode
    }

    fn color(&self, token: ColorToken) -> Color {
        match (self.mode, token) {
            (_, ColorToken::PrimaryAccent) => Color::rgb(0x4f, 0x46, 0xe5),
            (ThemeMode::Light, ColorToken::Background) => Color::rgb(0xff, 0xff, 0xff),
            (ThemeMode::Dark, ColorToken::Background) => Color::rgb(0x11, 0x11, 0x18),
            (ThemeMode::Light, ColorToken::Foreground) => Color::rgb(0x11, 0x11, 0x18),
            (ThemeMode::Dark, ColorToken::Foreground) => Color::rgb(0xf5, 0xf5, 0xf7),
        }
    }
}

/// The mark has to contrast with the background, so a dark theme gets the
/// light artwork and vice versa.
pub fn mark_variant(mode: ThemeMode) -> MarkVariant {
    match mode {
        ThemeMode::Light => MarkVariant::Dark,
        ThemeMode::Dark => MarkVariant::Light,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_contrasts_with_theme() {
        assert_eq!(mark_variant(ThemeMode::Light), MarkVariant::Dark);
        assert_eq!(mark_variant(ThemeMode::Dark), MarkVariant::Light);
    }

    #[test]
    fn colors_render_as_hex() {
        let theme = StaticTheme::new(ThemeMode::Dark);
        assert_eq!(theme.color(ColorToken::Background).to_string(), "#111118");
    }
}
