use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must start with '#': {0}")]
    MissingHash(String),
    #[error("color must have 3, 6 or 8 hex digits: {0}")]
    BadLength(String),
    #[error("invalid hex digit in color: {0}")]
    BadDigit(String),
}

/// Straight-alpha RGBA color.
///
/// Serializes as a CSS-style hex string so settings files stay hand-editable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#rgb`, `#rrggbb` and `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !hex.is_ascii() {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }

        let digit = |i: usize, len: usize| -> Result<u8, ColorParseError> {
            u8::from_str_radix(&hex[i..i + len], 16)
                .map_err(|_| ColorParseError::BadDigit(s.to_string()))
        };

        match hex.len() {
            3 => {
                // #f0a → #ff00aa
                let r = digit(0, 1)?;
                let g = digit(1, 1)?;
                let b = digit(2, 1)?;
                Ok(Color::rgb(r * 17, g * 17, b * 17))
            }
            6 => Ok(Color::rgb(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
            8 => Ok(Color::rgba(
                digit(0, 2)?,
                digit(2, 2)?,
                digit(4, 2)?,
                digit(6, 2)?,
            )),
            _ => Err(ColorParseError::BadLength(s.to_string())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::short("#ff0", Color::YELLOW)]
    #[case::long("#ffff00", Color::YELLOW)]
    #[case::upper("#0000FF", Color::BLUE)]
    #[case::with_alpha("#ff000080", Color::rgba(255, 0, 0, 128))]
    fn test_parse_valid(#[case] input: &str, #[case] expected: Color) {
        assert_eq!(input.parse::<Color>().unwrap(), expected);
    }

    #[rstest]
    #[case::no_hash("ff0")]
    #[case::bad_length("#ff00")]
    #[case::bad_digit("#ggg")]
    #[case::empty("#")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Color>().is_err());
    }

    #[test]
    fn test_display_omits_opaque_alpha() {
        assert_eq!(Color::YELLOW.to_string(), "#ffff00");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_string(), "#01020304");
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let json = serde_json::to_string(&Color::RED).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"#f00\"").unwrap();
        assert_eq!(back, Color::RED);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }
}
