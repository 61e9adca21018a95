//! Theme colours for generated decks.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Six hex digits with an optional leading '#'.
static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})$").unwrap());

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Default navy used when no usable primary colour is supplied.
    pub const NAVY: Rgb = Rgb::new(0, 51, 102);

    /// Neutral gray used for body text.
    pub const DARK_GRAY: Rgb = Rgb::new(80, 80, 80);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` or `RRGGBB` string.
    pub fn from_hex(input: &str) -> Option<Self> {
        let caps = HEX_COLOR_REGEX.captures(input.trim())?;
        let channel = |i: usize| u8::from_str_radix(&caps[i], 16).ok();
        Some(Self::new(channel(1)?, channel(2)?, channel(3)?))
    }

    /// Upper-case hex digits without a leading '#', as OOXML expects.
    pub fn to_hex(self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Colours applied to every slide of a deck.
///
/// Each render call owns its own copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Accent colour for titles, rules, bars, picture borders and the closing slide.
    pub primary: Rgb,
    /// Body text colour; always neutral gray.
    pub secondary: Rgb,
}

impl Theme {
    pub fn new(primary: Rgb) -> Self {
        Self {
            primary,
            secondary: Rgb::DARK_GRAY,
        }
    }

    /// Build a theme from user input, falling back to navy when it does not parse.
    pub fn from_hex_or_default(input: &str) -> Self {
        match Rgb::from_hex(input) {
            Some(primary) => Self::new(primary),
            None => {
                log::warn!(
                    "Unrecognized theme colour '{}', using default {}",
                    input,
                    Rgb::NAVY
                );
                Self::default()
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(Rgb::NAVY)
    }
}
