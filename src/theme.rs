//! Theme configuration and colors.
//!
//! Nutz has two themes, light and dark. The active palette is the root
//! presentation attribute every renderer reads, so it is recomputed whenever
//! the theme changes. Palettes are provided by the `ratatui-themes` crate.

use ratatui::style::{Color, Modifier, Style};
use ratatui_themes::{ThemeName, ThemePalette};
use serde::{Deserialize, Serialize};

use crate::session::{KEY_THEME, SessionStore};

/// Light or dark
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light background, dark text
    #[default]
    Light,
    /// Dark background, light text
    Dark,
}

impl Theme {
    /// The other theme
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Value stored in the session store
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored value; only the two exact slugs are accepted
    pub fn from_slug(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Icon for the navbar toggle (shows what you switch to)
    #[must_use]
    pub const fn toggle_icon(self) -> &'static str {
        match self {
            Self::Light => "🌙",
            Self::Dark => "☀️",
        }
    }

    /// Scheme from `ratatui-themes` backing this theme
    #[must_use]
    pub const fn scheme(self) -> ThemeName {
        match self {
            Self::Light => ThemeName::CatppuccinLatte,
            Self::Dark => ThemeName::CatppuccinMocha,
        }
    }

    /// Get the color palette for this theme
    #[must_use]
    pub fn colors(self) -> ThemeColors {
        ThemeColors::from_palette(self.scheme().palette())
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

/// Theme state restored from, and written through to, the session store
#[derive(Debug, Clone)]
pub struct ThemeState {
    theme: Theme,
    colors: ThemeColors,
}

impl ThemeState {
    /// Restore the saved theme (unknown values fall back to light) and apply it
    pub fn restore(store: &mut impl SessionStore) -> Self {
        let theme = store
            .get(KEY_THEME)
            .and_then(|s| Theme::from_slug(&s))
            .unwrap_or_default();

        let mut state = Self {
            theme,
            colors: theme.colors(),
        };
        state.apply(store);
        state
    }

    /// Current theme
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Active palette
    pub const fn colors(&self) -> &ThemeColors {
        &self.colors
    }

    /// Flip the theme, persist it and re-apply the palette
    pub fn toggle(&mut self, store: &mut impl SessionStore) -> Theme {
        self.theme = self.theme.toggled();
        self.apply(store);
        self.theme
    }

    fn apply(&mut self, store: &mut impl SessionStore) {
        store.set(KEY_THEME, self.theme.slug());
        self.colors = self.theme.colors();
    }
}

/// Color palette for UI elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    /// Primary background color
    pub bg: Color,
    /// Secondary background for panels/cards
    pub bg_secondary: Color,
    /// Primary foreground/text color
    pub fg: Color,
    /// Muted text color (lowest contrast)
    pub fg_muted: Color,

    /// Primary accent color
    pub primary: Color,
    /// Secondary accent color
    pub accent: Color,

    /// Success state color
    pub success: Color,
    /// Warning state color
    pub warning: Color,
    /// Error state color
    pub error: Color,

    /// Border color (unfocused)
    pub border: Color,
    /// Border color (focused)
    pub border_focus: Color,
    /// Selection/highlight background
    pub selection: Color,
}

impl ThemeColors {
    /// Create `ThemeColors` from a `ThemePalette`
    #[must_use]
    pub fn from_palette(p: ThemePalette) -> Self {
        Self {
            bg: p.bg,
            bg_secondary: Self::adjust_brightness(p.bg, 10),
            fg: p.fg,
            fg_muted: p.muted,

            primary: p.accent,
            accent: p.secondary,

            success: p.success,
            warning: p.warning,
            error: p.error,

            border: p.muted,
            border_focus: p.accent,
            selection: p.selection,
        }
    }

    /// Shift an RGB color towards white (positive) or black (negative)
    fn adjust_brightness(color: Color, amount: i16) -> Color {
        if let Color::Rgb(r, g, b) = color {
            let delta = amount.unsigned_abs().min(255) as u8;
            let adjust = |c: u8| {
                if amount > 0 {
                    c.saturating_add(delta)
                } else {
                    c.saturating_sub(delta)
                }
            };
            Color::Rgb(adjust(r), adjust(g), adjust(b))
        } else {
            color
        }
    }

    // Style helpers

    /// Default text style
    #[must_use]
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Muted text style
    #[must_use]
    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.fg_muted)
    }

    /// Primary accent style
    #[must_use]
    pub fn text_primary(&self) -> Style {
        Style::default().fg(self.primary)
    }

    /// Success style
    #[must_use]
    pub fn text_success(&self) -> Style {
        Style::default().fg(self.success)
    }

    /// Warning style
    #[must_use]
    pub fn text_warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    /// Error style
    #[must_use]
    pub fn text_error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Block border style
    #[must_use]
    pub fn block(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Focused block border style
    #[must_use]
    pub fn block_focus(&self) -> Style {
        Style::default().fg(self.border_focus)
    }

    /// Selected item style
    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default()
            .bg(self.selection)
            .fg(self.fg)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for shortcuts)
    #[must_use]
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Brand/logo style
    #[must_use]
    pub fn brand(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    #[test]
    fn test_default_is_light_and_persisted() {
        let mut store = MemoryStore::new();
        let state = ThemeState::restore(&mut store);
        assert_eq!(state.theme(), Theme::Light);
        assert_eq!(store.get(KEY_THEME).as_deref(), Some("light"));
    }

    #[test]
    fn test_unknown_stored_value_falls_back() {
        let mut store = MemoryStore::new();
        store.set(KEY_THEME, "solarized");
        assert_eq!(ThemeState::restore(&mut store).theme(), Theme::Light);
    }

    #[test]
    fn test_toggle_twice_round_trips() {
        let mut store = MemoryStore::new();
        let mut state = ThemeState::restore(&mut store);

        assert_eq!(state.toggle(&mut store), Theme::Dark);
        assert_eq!(store.get(KEY_THEME).as_deref(), Some("dark"));
        assert_eq!(*state.colors(), Theme::Dark.colors());

        assert_eq!(state.toggle(&mut store), Theme::Light);
        assert_eq!(store.get(KEY_THEME).as_deref(), Some("light"));
        assert_eq!(*state.colors(), Theme::Light.colors());
        assert_ne!(Theme::Light.colors(), Theme::Dark.colors());
    }

    #[test]
    fn test_schemes() {
        assert_eq!(Theme::Light.scheme(), ThemeName::CatppuccinLatte);
        assert_eq!(Theme::Dark.scheme(), ThemeName::CatppuccinMocha);
        let colors = Theme::Dark.colors();
        assert_eq!(colors.border_focus, colors.primary);
    }

    #[test]
    fn test_adjust_brightness_saturates() {
        assert_eq!(
            ThemeColors::adjust_brightness(Color::Rgb(250, 5, 100), 10),
            Color::Rgb(255, 15, 110)
        );
        assert_eq!(
            ThemeColors::adjust_brightness(Color::Rgb(250, 5, 100), -10),
            Color::Rgb(240, 0, 90)
        );
        assert_eq!(ThemeColors::adjust_brightness(Color::Red, 10), Color::Red);
    }

    #[test]
    fn test_restores_dark() {
        let mut store = MemoryStore::new();
        store.set(KEY_THEME, "dark");
        let state = ThemeState::restore(&mut store);
        assert_eq!(state.theme(), Theme::Dark);
        assert_eq!(state.theme().toggle_icon(), "☀️");
    }
}
