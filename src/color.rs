// Simple color struct, created from an unsigned 32 representing RRGGBBAA
// or parsed from the CSS color strings the page styles use

use crate::error::FieldError;
use serde::Deserialize;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    pub fn from_u32(num: u32) -> Color {
        let r = (num >> 24) as u8;
        let g = (num >> 16) as u8;
        let b = (num >> 8) as u8;
        let a = num as u8;

        Color { r, g, b, a }
    }

    pub fn alpha(&self) -> f64 {
        self.a as f64 / 255.0
    }

    // Canvas fillStyle / strokeStyle form
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            round_alpha(self.alpha())
        )
    }

    fn named(name: &str) -> Option<Color> {
        let packed = match name {
            "black" => 0x000000ff,
            "white" => 0xffffffff,
            "red" => 0xff0000ff,
            "green" => 0x008000ff,
            "blue" => 0x0000ffff,
            "yellow" => 0xffff00ff,
            "orange" => 0xffa500ff,
            "purple" => 0x800080ff,
            "crimson" => 0xdc143cff,
            "maroon" => 0x800000ff,
            "gray" | "grey" => 0x808080ff,
            "transparent" => 0x00000000,
            _ => return None,
        };
        Some(Color::from_u32(packed))
    }

    fn from_hex(hex: &str) -> Option<Color> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let expanded: String = match hex.len() {
            3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 | 8 => hex.to_owned(),
            _ => return None,
        };
        let value = u32::from_str_radix(&expanded, 16).ok()?;
        if expanded.len() == 6 {
            Some(Color::from_u32((value << 8) | 0xff))
        } else {
            Some(Color::from_u32(value))
        }
    }

    // rgb(r, g, b) / rgba(r, g, b, a) with a in [0, 1]
    fn from_functional(text: &str) -> Option<Color> {
        let (args, has_alpha) = if let Some(rest) = text.strip_prefix("rgba(") {
            (rest.strip_suffix(')')?, true)
        } else if let Some(rest) = text.strip_prefix("rgb(") {
            (rest.strip_suffix(')')?, false)
        } else {
            return None;
        };

        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        let expected = if has_alpha { 4 } else { 3 };
        if parts.len() != expected {
            return None;
        }

        let channel = |s: &str| -> Option<u8> {
            let v: f64 = s.parse().ok()?;
            if (0.0..=255.0).contains(&v) {
                Some(v.round() as u8)
            } else {
                None
            }
        };
        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if has_alpha {
            let v: f64 = parts[3].parse().ok()?;
            if !(0.0..=1.0).contains(&v) {
                return None;
            }
            (v * 255.0).round() as u8
        } else {
            0xff
        };

        Some(Color { r, g, b, a })
    }
}

fn round_alpha(alpha: f64) -> f64 {
    (alpha * 1000.0).round() / 1000.0
}

impl FromStr for Color {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Color, FieldError> {
        let text = s.trim().to_ascii_lowercase();
        let parsed = match text.strip_prefix('#') {
            Some(hex) => Color::from_hex(hex),
            None => Color::from_functional(&text).or_else(|| Color::named(&text)),
        };
        parsed.ok_or_else(|| FieldError::InvalidColor(s.to_owned()))
    }
}

impl TryFrom<String> for Color {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Color, FieldError> {
        value.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}
