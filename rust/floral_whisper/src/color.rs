//! Color Values and Palette
//!
//! This module provides the 8-bit RGBA color type used by the raster and the
//! swatch palette offered by the drawing toolbar.
//!
//! Color workflow:
//! - The toolbar hands out CSS-style hex strings (e.g. `#E11D48`)
//! - Hex strings are parsed once into `Rgba` when the brush color changes
//! - The raster blends in gamma (sRGB) space, the same as a 2D browser canvas

/// An 8-bit RGBA color (sRGB, straight alpha)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Opaque white, the paper color of every sketch
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// Create an opaque color from its RGB components
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a `#RRGGBB` or `#RGB` hex string (leading `#` optional)
    ///
    /// Returns `None` for anything else, including alpha forms.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::opaque(r, g, b))
            }
            3 => {
                // #RGB expands each nibble: #F0A -> #FF00AA
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|n| n * 17);
                Some(Self::opaque(nibble(0).ok()?, nibble(1).ok()?, nibble(2).ok()?))
            }
            _ => None,
        }
    }

    /// Format as an uppercase `#RRGGBB` string (alpha is dropped)
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A named toolbar color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub name: &'static str,
    pub value: &'static str,
}

/// Colors offered by the drawing toolbar, in display order
pub const PALETTE: [Swatch; 8] = [
    Swatch { name: "Charcoal", value: "#374151" },
    Swatch { name: "Rose", value: "#E11D48" },
    Swatch { name: "Sunflower", value: "#FACC15" },
    Swatch { name: "Leaf", value: "#22C55E" },
    Swatch { name: "Sky", value: "#3B82F6" },
    Swatch { name: "Lavender", value: "#A855F7" },
    Swatch { name: "Orange", value: "#F97316" },
    Swatch { name: "Pink", value: "#EC4899" },
];

/// Brush color a fresh surface starts with (Charcoal)
pub const DEFAULT_COLOR: Rgba = Rgba::opaque(0x37, 0x41, 0x51);
