//! Palettes and color helpers.

use ratatui::style::Color;
use tagdeck_core::Tag;
use tagdeck_query::QueryStatus;

#[derive(Debug, Clone)]
pub struct DeckTheme {
    pub bg: Color,
    pub bg_secondary: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl DeckTheme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(14, 16, 20),
            bg_secondary: Color::Rgb(28, 31, 38),
            bg_highlight: Color::Rgb(44, 49, 60),
            primary: Color::Rgb(97, 175, 239),
            primary_dim: Color::Rgb(52, 96, 132),
            secondary: Color::Rgb(198, 120, 221),
            success: Color::Rgb(152, 195, 121),
            warning: Color::Rgb(229, 192, 123),
            error: Color::Rgb(224, 108, 117),
            info: Color::Rgb(86, 182, 194),
            text: Color::Rgb(220, 223, 228),
            text_dim: Color::Rgb(140, 146, 158),
            text_muted: Color::Rgb(92, 99, 112),
            border: Color::Rgb(62, 68, 81),
            border_focus: Color::Rgb(97, 175, 239),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 250),
            bg_secondary: Color::Rgb(238, 238, 240),
            bg_highlight: Color::Rgb(220, 224, 232),
            primary: Color::Rgb(64, 120, 242),
            primary_dim: Color::Rgb(150, 180, 245),
            secondary: Color::Rgb(166, 38, 164),
            success: Color::Rgb(80, 161, 79),
            warning: Color::Rgb(193, 132, 1),
            error: Color::Rgb(228, 86, 73),
            info: Color::Rgb(1, 132, 188),
            text: Color::Rgb(56, 58, 66),
            text_dim: Color::Rgb(105, 108, 119),
            text_muted: Color::Rgb(160, 161, 167),
            border: Color::Rgb(200, 202, 208),
            border_focus: Color::Rgb(64, 120, 242),
        }
    }

    /// Palette for a validated `theme.name`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

/// Swatch color for a tag; unparseable colors fall back to dim text.
pub fn tag_color(tag: &Tag, theme: &DeckTheme) -> Color {
    tag.rgb()
        .map(|rgb| Color::Rgb(rgb.r, rgb.g, rgb.b))
        .unwrap_or(theme.text_dim)
}

pub fn query_status_color(status: QueryStatus, theme: &DeckTheme) -> Color {
    match status {
        QueryStatus::Idle => theme.text_muted,
        QueryStatus::Loading => theme.warning,
        QueryStatus::Fresh => theme.success,
        QueryStatus::Stale => theme.info,
        QueryStatus::Error => theme.error,
    }
}
