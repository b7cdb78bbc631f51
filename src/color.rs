use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An immutable RGBA color value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xff);
pub const BROWN: Color = Color::rgb(0x96, 0x4b, 0x00);
pub const GREEN: Color = Color::rgb(0x00, 0xff, 0x00);
pub const ORANGE: Color = Color::rgb(0xff, 0xa5, 0x00);
pub const PURPLE: Color = Color::rgb(0x80, 0x00, 0x80);
pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);
pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
pub const TRANSPARENT: Color = Color::rgba(0x00, 0x00, 0x00, 0x00);

impl Color {
    /// Creates a fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Byte accessors: (r, g, b, a).
    pub fn int_rgba(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    pub fn int_rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Float accessors in [0, 1]: (r, g, b).
    pub fn float_rgb(&self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    pub fn float_a(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Hex representation without alpha, e.g. `#ff0000`.
    pub fn hex_rgb(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Returns black or white, whichever reads better on this color.
    pub fn text_color(&self) -> Color {
        let luminance = 0.299 * f64::from(self.r) + 0.587 * f64::from(self.g)
            + 0.114 * f64::from(self.b);
        if luminance >= 0.5 * 255.0 {
            BLACK
        } else {
            WHITE
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "{}", self.hex_rgb())
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses a named color or a `#rgb`, `#rrggbb` or `#rrggbbaa` hex value.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "black" => return Ok(BLACK),
            "blue" => return Ok(BLUE),
            "brown" => return Ok(BROWN),
            "green" => return Ok(GREEN),
            "orange" => return Ok(ORANGE),
            "purple" => return Ok(PURPLE),
            "red" => return Ok(RED),
            "yellow" => return Ok(YELLOW),
            "white" => return Ok(WHITE),
            "transparent" => return Ok(TRANSPARENT),
            _ => {}
        }

        let hex = s
            .strip_prefix('#')
            .filter(|h| h.is_ascii())
            .ok_or_else(|| Error::InvalidColor(s.to_string()))?;
        let byte = |from: usize| -> Result<u8> {
            u8::from_str_radix(&hex[from..from + 2], 16)
                .map_err(|_| Error::InvalidColor(s.to_string()))
        };
        match hex.len() {
            3 => {
                let nibble = |from: usize| -> Result<u8> {
                    u8::from_str_radix(&hex[from..from + 1], 16)
                        .map_err(|_| Error::InvalidColor(s.to_string()))
                };
                let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
                Ok(Color::rgb(r * 17, g * 17, b * 17))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(Error::InvalidColor(s.to_string())),
        }
    }
}
