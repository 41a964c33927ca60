//! Tint colors

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// RGB tint color
///
/// Parsed from `#RRGGBB`, `#RGB`, `white` or `black`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ColorSpec {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorSpec {
    pub const BLACK: ColorSpec = ColorSpec::rgb(0, 0, 0);
    pub const WHITE: ColorSpec = ColorSpec::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Color string was not understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidColor(pub String);

impl fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color {:?}", self.0)
    }
}

impl std::error::Error for InvalidColor {}

impl FromStr for ColorSpec {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || InvalidColor(s.to_string());

        if trimmed.eq_ignore_ascii_case("white") {
            return Ok(ColorSpec::WHITE);
        }
        if trimmed.eq_ignore_ascii_case("black") {
            return Ok(ColorSpec::BLACK);
        }

        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

        match hex.len() {
            6 => Ok(ColorSpec::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // #RGB expands each digit: #7af == #77aaff
            3 => Ok(ColorSpec::rgb(
                channel(&hex[0..1])? * 0x11,
                channel(&hex[1..2])? * 0x11,
                channel(&hex[2..3])? * 0x11,
            )),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for ColorSpec {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColorSpec> for String {
    fn from(color: ColorSpec) -> Self {
        color.to_string()
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
