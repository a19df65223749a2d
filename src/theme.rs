use std::fs;
use std::path::Path;

use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Theme {
    pub slot_bg: Color,
    pub chat_bg: Color,
    pub sidebar_bg: Color,
    pub input_bg: Color,
    pub status_bg: Color,
    pub text_fg: Color,
    pub muted_fg: Color,
    pub active_fg: Color,
    pub terminal_fg: Color,
    pub accent_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            slot_bg: Color::Rgb(30, 32, 38),
            chat_bg: Color::Rgb(44, 44, 48),
            sidebar_bg: Color::Rgb(38, 38, 44),
            input_bg: Color::Rgb(58, 58, 64),
            status_bg: Color::Rgb(26, 26, 30),
            text_fg: Color::Rgb(225, 225, 225),
            muted_fg: Color::Rgb(150, 150, 160),
            active_fg: Color::Rgb(255, 255, 255),
            terminal_fg: Color::Rgb(74, 222, 128),
            accent_fg: Color::Rgb(99, 102, 241),
        }
    }
}

impl Theme {
    /// Loads the theme file, falling back to the built-in palette when it is missing or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path_ref = path.as_ref();
        match fs::read_to_string(path_ref) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(theme) => theme,
                Err(err) => {
                    log::warn!(
                        "failed to parse theme file '{}': {err}; using defaults",
                        path_ref.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::info!(
                    "no theme file at '{}' ({err}); using defaults",
                    path_ref.display()
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let cfg: ThemeToml = toml::from_str(s)?;
        let defaults = Self::default();
        let colors = cfg.colors;
        let pick =
            |value: Option<RgbToml>, fallback: Color| value.map_or(fallback, |rgb| rgb.to_color());
        Ok(Self {
            slot_bg: pick(colors.slot_bg, defaults.slot_bg),
            chat_bg: pick(colors.chat_bg, defaults.chat_bg),
            sidebar_bg: pick(colors.sidebar_bg, defaults.sidebar_bg),
            input_bg: pick(colors.input_bg, defaults.input_bg),
            status_bg: pick(colors.status_bg, defaults.status_bg),
            text_fg: pick(colors.text_fg, defaults.text_fg),
            muted_fg: pick(colors.muted_fg, defaults.muted_fg),
            active_fg: pick(colors.active_fg, defaults.active_fg),
            terminal_fg: pick(colors.terminal_fg, defaults.terminal_fg),
            accent_fg: pick(colors.accent_fg, defaults.accent_fg),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ThemeToml {
    colors: ThemeColorsToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThemeColorsToml {
    slot_bg: Option<RgbToml>,
    chat_bg: Option<RgbToml>,
    sidebar_bg: Option<RgbToml>,
    input_bg: Option<RgbToml>,
    status_bg: Option<RgbToml>,
    text_fg: Option<RgbToml>,
    muted_fg: Option<RgbToml>,
    active_fg: Option<RgbToml>,
    terminal_fg: Option<RgbToml>,
    accent_fg: Option<RgbToml>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RgbToml {
    r: u8,
    g: u8,
    b: u8,
}

impl RgbToml {
    fn to_color(self) -> Color {
        Color::Rgb(self.r, self.g, self.b)
    }
}
