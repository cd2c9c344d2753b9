use anyhow::{bail, Context, Result};
use ratatui::style::{Color, Modifier, Style};
use std::fmt;
use tracing::warn;

use crate::config::ThemeConfig;
use crate::terminal::surface::SegmentStyle;

/// 24-bit true color support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrueColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl TrueColor {
    /// Create a new true color from RGB values
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    ///
    /// # Errors
    /// Returns an error if the string is not six hex digits
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            bail!("Invalid hex color '{hex}': expected #RRGGBB");
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .with_context(|| format!("Invalid hex color '{hex}'"))
        };

        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Convert to hex string
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for TrueColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<TrueColor> for Color {
    fn from(c: TrueColor) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }
}

/// Resolved colours for the interactive front end
#[derive(Debug, Clone)]
pub struct Palette {
    pub foreground: TrueColor,
    pub background: TrueColor,
    pub user: TrueColor,
    pub host: TrueColor,
    pub path: TrueColor,
    pub accent: TrueColor,
    pub success: TrueColor,
    pub error: TrueColor,
    pub banner: TrueColor,
    pub tab_active: TrueColor,
    pub tab_inactive: TrueColor,
}

impl Palette {
    /// Resolve a theme, keeping the built-in colour for any invalid entry
    #[must_use]
    pub fn from_theme(theme: &ThemeConfig) -> Self {
        let fallback = Self::default();
        let pick = |value: &str, default: TrueColor| {
            TrueColor::from_hex(value).unwrap_or_else(|e| {
                warn!("{e:#}, using {default}");
                default
            })
        };

        Self {
            foreground: pick(&theme.foreground, fallback.foreground),
            background: pick(&theme.background, fallback.background),
            user: pick(&theme.user, fallback.user),
            host: pick(&theme.host, fallback.host),
            path: pick(&theme.path, fallback.path),
            accent: pick(&theme.accent, fallback.accent),
            success: pick(&theme.success, fallback.success),
            error: pick(&theme.error, fallback.error),
            banner: pick(&theme.banner, fallback.banner),
            tab_active: pick(&theme.tab_active, fallback.tab_active),
            tab_inactive: pick(&theme.tab_inactive, fallback.tab_inactive),
        }
    }

    /// Style for a segment role; user, host, path and banner are bold
    #[must_use]
    pub fn style(&self, style: SegmentStyle) -> Style {
        let (color, bold) = match style {
            SegmentStyle::Plain => (self.foreground, false),
            SegmentStyle::User => (self.user, true),
            SegmentStyle::Host => (self.host, true),
            SegmentStyle::Path => (self.path, true),
            SegmentStyle::Accent => (self.accent, true),
            SegmentStyle::Success => (self.success, true),
            SegmentStyle::Error => (self.error, true),
            SegmentStyle::Banner => (self.banner, true),
        };

        let base = Style::default().fg(color.into());
        if bold {
            base.add_modifier(Modifier::BOLD)
        } else {
            base
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: TrueColor::new(0xF8, 0xFA, 0xFC),   // #F8FAFC
            background: TrueColor::new(0x0A, 0x0F, 0x1C),   // #0A0F1C
            user: TrueColor::new(0x10, 0xB9, 0x81),         // #10B981 - green
            host: TrueColor::new(0x3B, 0x82, 0xF6),         // #3B82F6 - blue
            path: TrueColor::new(0xF5, 0x9E, 0x0B),         // #F59E0B - amber
            accent: TrueColor::new(0xFB, 0xBF, 0x24),       // #FBBF24 - bright yellow
            success: TrueColor::new(0x34, 0xD3, 0x99),      // #34D399 - bright green
            error: TrueColor::new(0xEF, 0x44, 0x44),        // #EF4444 - red
            banner: TrueColor::new(0x10, 0xB9, 0x81),       // #10B981
            tab_active: TrueColor::new(0xB8, 0x86, 0x0B),   // #B8860B - gold
            tab_inactive: TrueColor::new(0x94, 0xA3, 0xB8), // #94A3B8 - slate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_color_to_hex() {
        let color = TrueColor::new(255, 136, 0);
        assert_eq!(color.to_hex(), "#FF8800");
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(TrueColor::from_hex("#b8860b").unwrap(), TrueColor::new(0xB8, 0x86, 0x0B));
        assert_eq!(TrueColor::from_hex("0A0F1C").unwrap(), TrueColor::new(0x0A, 0x0F, 0x1C));
        assert!(TrueColor::from_hex("#FFF").is_err());
        assert!(TrueColor::from_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_default_theme_matches_palette() {
        let palette = Palette::from_theme(&ThemeConfig::default());
        assert_eq!(palette.error, Palette::default().error);
        assert_eq!(palette.tab_active.to_hex(), "#B8860B");
    }

    #[test]
    fn test_invalid_theme_entry_falls_back() {
        let theme = ThemeConfig {
            user: "not-a-color".to_string(),
            ..ThemeConfig::default()
        };
        let palette = Palette::from_theme(&theme);
        assert_eq!(palette.user, Palette::default().user);
    }

    #[test]
    fn test_prompt_styles_are_distinct() {
        let palette = Palette::default();
        let user = palette.style(SegmentStyle::User);
        let host = palette.style(SegmentStyle::Host);
        let path = palette.style(SegmentStyle::Path);
        assert_ne!(user.fg, host.fg);
        assert_ne!(host.fg, path.fg);
    }
}
