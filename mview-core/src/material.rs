/// Surface material and colour parsing
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tonemap::srgb_to_linear;

/// An 8-bit sRGB colour, written as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("invalid color {0:?}")]
pub struct InvalidColor(pub String);

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const RED: Color = Color::from_rgb(0xff, 0x00, 0x00);
    pub const ALUMINIUM: Color = Color::from_rgb(0xf5, 0xf6, 0xf6);

    /// Linear-light RGB in `[0, 1]`, for shading.
    pub fn to_linear(&self) -> [f32; 3] {
        [self.r, self.g, self.b].map(|c| srgb_to_linear(c as f32 / 255.0))
    }
}

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidColor(s.to_owned());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;

        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

        match hex.len() {
            6 => Ok(Self::from_rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            // #rgb expands each digit, so #f00 is #ff0000
            3 => Ok(Self::from_rgb(
                channel(&hex[0..1])? * 0x11,
                channel(&hex[1..2])? * 0x11,
                channel(&hex[2..3])? * 0x11,
            )),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Metal/rough PBR material shared by every mesh in the scene
#[derive(Clone, Debug, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub metalness: f32,
    pub roughness: f32,
    pub wireframe: bool,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::from_rgb(0xff, 0xff, 0xff),
            metalness: 0.0,
            roughness: 1.0,
            wireframe: false,
        }
    }
}
