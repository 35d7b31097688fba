//! Color parsing for tag swatches.
//!
//! Tags store color as free text. Hex forms (`#rgb`, `#rrggbb`) and a small
//! set of CSS names resolve to RGB; anything else is displayed as text only.

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color is empty")]
    Empty,
    #[error("unrecognized color '{0}'")]
    Unrecognized(String),
}

const NAMED: &[(&str, Rgb)] = &[
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 128, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("orange", Rgb::new(255, 165, 0)),
    ("purple", Rgb::new(128, 0, 128)),
    ("pink", Rgb::new(255, 192, 203)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("gray", Rgb::new(128, 128, 128)),
    ("grey", Rgb::new(128, 128, 128)),
];

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ColorError::Empty);
        }
        let unrecognized = || ColorError::Unrecognized(trimmed.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(unrecognized());
            }
            return match hex.len() {
                3 => {
                    let digit = |i: usize| {
                        u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17)
                    };
                    Ok(Rgb::new(
                        digit(0).map_err(|_| unrecognized())?,
                        digit(1).map_err(|_| unrecognized())?,
                        digit(2).map_err(|_| unrecognized())?,
                    ))
                }
                6 => {
                    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                    Ok(Rgb::new(
                        pair(0).map_err(|_| unrecognized())?,
                        pair(2).map_err(|_| unrecognized())?,
                        pair(4).map_err(|_| unrecognized())?,
                    ))
                }
                _ => Err(unrecognized()),
            };
        }

        let lower = trimmed.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, rgb)| *rgb)
            .ok_or_else(unrecognized)
    }
}
