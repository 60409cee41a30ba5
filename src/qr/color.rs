//! Hex color parsing
//!
//! Accepts `RRGGBB` or the short `RGB` form and always yields an opaque color.

use crate::error::ColorError;

/// Opaque RGBA color used for QR modules and background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse a 3 or 6 digit hex string (no leading `#`)
    ///
    /// # Examples
    /// ```
    /// use qrcode_restapi::qr::Color;
    /// assert_eq!(Color::parse_hex("f00"), Ok(Color::rgb(255, 0, 0)));
    /// assert_eq!(Color::parse_hex("0a0b0c"), Ok(Color::rgb(10, 11, 12)));
    /// assert!(Color::parse_hex("#f00").is_err());
    /// ```
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidColorFormat(s.to_string());

        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match s.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| invalid());
                Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                // Replicate each nibble: 0xf * 17 == 0xff
                let channel =
                    |i: usize| u8::from_str_radix(&s[i..=i], 16).map(|n| n * 17).map_err(|_| invalid());
                Ok(Self::rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(invalid()),
        }
    }

    /// `#rrggbb` form used in SVG attributes
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub const fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}
