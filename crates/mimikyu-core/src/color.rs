//! Packed 24-bit RGB colors.
//!
//! Cells on the wire are integers in `0xRRGGBB` form. Edit commands carry the
//! color as a CSS-style `rgb(r,g,b)` string with no spaces, which is what the
//! color picker renders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest legal packed color value.
pub const MAX_PACKED: u32 = 0x00FF_FFFF;

/// Errors produced while parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("Unrecognized color format: {0}")]
    UnknownFormat(String),
    #[error("Expected 3 color components, found {0}")]
    ComponentCount(usize),
    #[error("Invalid color component: {0}")]
    InvalidComponent(String),
}

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Neutral color forced when switching to erase mode.
    pub const ERASE: Rgb = Rgb::new(169, 177, 214);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` integer. Returns `None` for values wider than 24 bits.
    pub const fn from_packed(value: u32) -> Option<Self> {
        if value > MAX_PACKED {
            return None;
        }
        Some(Self::new(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        ))
    }

    /// Pack into a `0xRRGGBB` integer.
    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Render as `#rrggbb`.
    pub fn to_hex_string(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Render as `rgb(r,g,b)` with no spaces (the wire form).
    pub fn to_rgb_string(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Parse `rgb(r,g,b)`. Whitespace around components is tolerated.
    pub fn parse_rgb(s: &str) -> Result<Self, ColorParseError> {
        let inner = s
            .trim()
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ColorParseError::UnknownFormat(s.to_string()))?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ColorParseError::ComponentCount(parts.len()));
        }

        let component = |part: &str| {
            part.parse::<u8>()
                .map_err(|_| ColorParseError::InvalidComponent(part.to_string()))
        };

        Ok(Self::new(
            component(parts[0])?,
            component(parts[1])?,
            component(parts[2])?,
        ))
    }

    /// Parse `#rgb` or `#rrggbb`.
    pub fn parse_hex(s: &str) -> Result<Self, ColorParseError> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::UnknownFormat(s.to_string()))?;

        let channel = |digits: &str| {
            u8::from_str_radix(digits, 16)
                .map_err(|_| ColorParseError::InvalidComponent(digits.to_string()))
        };

        match hex.len() {
            3 if hex.is_ascii() => Ok(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
            )),
            6 if hex.is_ascii() => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(ColorParseError::UnknownFormat(s.to_string())),
        }
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim_start().starts_with('#') {
            Self::parse_hex(s)
        } else {
            Self::parse_rgb(s)
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_red() {
        assert_eq!(Rgb::new(255, 0, 0).to_packed(), 16_711_680);
        assert_eq!(Rgb::from_packed(16_711_680), Some(Rgb::new(255, 0, 0)));
    }

    #[test]
    fn test_from_packed_rejects_wide_values() {
        assert_eq!(Rgb::from_packed(MAX_PACKED), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_packed(MAX_PACKED + 1), None);
    }

    #[test]
    fn test_string_renderings() {
        let c = Rgb::new(169, 177, 214);
        assert_eq!(c.to_rgb_string(), "rgb(169,177,214)");
        assert_eq!(c.to_hex_string(), "#a9b1d6");
        assert_eq!(c.to_string(), c.to_rgb_string());
    }

    #[test]
    fn test_parse_rgb_with_spaces() {
        assert_eq!(Rgb::parse_rgb("rgb(255, 0, 12)"), Ok(Rgb::new(255, 0, 12)));
        assert_eq!(Rgb::parse_rgb("rgb(1,2,3)"), Ok(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn test_parse_rgb_errors() {
        assert_eq!(
            Rgb::parse_rgb("rbg(0, 0, 0)"),
            Err(ColorParseError::UnknownFormat("rbg(0, 0, 0)".to_string()))
        );
        assert_eq!(Rgb::parse_rgb("rgb(1,2)"), Err(ColorParseError::ComponentCount(2)));
        assert_eq!(
            Rgb::parse_rgb("rgb(1,2,300)"),
            Err(ColorParseError::InvalidComponent("300".to_string()))
        );
        assert!(Rgb::parse_rgb("").is_err());
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse_hex("#FF0000"), Ok(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse_hex("#fff"), Ok(Rgb::WHITE));
        assert!(Rgb::parse_hex("#ff00").is_err());
        assert!(Rgb::parse_hex("ff0000").is_err());
    }

    #[test]
    fn test_from_str_dispatches_on_prefix() {
        assert_eq!("#000000".parse::<Rgb>(), Ok(Rgb::BLACK));
        assert_eq!("rgb(0,0,0)".parse::<Rgb>(), Ok(Rgb::BLACK));
    }
}
