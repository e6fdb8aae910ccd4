//! Color model: hex colors, three-tone material tiers and height gradients

use crate::error::PlantError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// 8-bit RGB color, serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (leading `#` optional)
    pub fn from_hex(hex: &str) -> Result<Self, PlantError> {
        let h = hex.trim().trim_start_matches('#');
        if h.len() != 6 || !h.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(PlantError::Color(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&h[i..i + 2], 16).map_err(|_| PlantError::Color(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build from float channels, rounding and clamping each to 0..=255
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
        Self::new(c(r), c(g), c(b))
    }

    /// Per-channel linear interpolation; callers keep `t` in [0, 1]
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let ch = |a: u8, b: u8| a as f64 + (b as f64 - a as f64) * t;
        Rgb::from_f64(ch(self.r, other.r), ch(self.g, other.g), ch(self.b, other.b))
    }
}

impl FromStr for Rgb {
    type Err = PlantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = PlantError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> String {
        c.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn hex(s: &str) -> Rgb {
    // Only used for the built-in palette literals below
    Rgb::from_hex(s).unwrap_or(Rgb::BLACK)
}

/// Main / light / dark tones of one material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorTier {
    pub main: Rgb,
    pub light: Rgb,
    pub dark: Rgb,
}

impl ColorTier {
    fn from_hex(main: &str, light: &str, dark: &str) -> Self {
        Self {
            main: hex(main),
            light: hex(light),
            dark: hex(dark),
        }
    }

    pub fn lerp(&self, other: &ColorTier, t: f64) -> ColorTier {
        ColorTier {
            main: self.main.lerp(other.main, t),
            light: self.light.lerp(other.light, t),
            dark: self.dark.lerp(other.dark, t),
        }
    }
}

/// Soil carries an extra accent tone for grains
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilTier {
    pub main: Rgb,
    pub light: Rgb,
    pub dark: Rgb,
    pub accent: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignColors {
    pub board: Rgb,
    pub post: Rgb,
    pub text: Rgb,
}

/// Every color the engine paints with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub pot: ColorTier,
    pub trunk_young: ColorTier,
    pub trunk_aged: ColorTier,
    pub weathered: ColorTier,
    pub old_leaf: ColorTier,
    pub new_sprout: ColorTier,
    pub soil: SoilTier,
    pub particle: ColorTier,
    pub pebble: ColorTier,
    pub moss: ColorTier,
    pub fallen_leaf: Rgb,
    pub snow: Rgb,
    pub sign: SignColors,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            pot: ColorTier::from_hex("#2D2D2D", "#3D3D3D", "#1F1F1F"),
            trunk_young: ColorTier::from_hex("#4A3728", "#5D4A3A", "#362818"),
            trunk_aged: ColorTier::from_hex("#4A7C59", "#5D9A6E", "#3A6147"),
            weathered: ColorTier::from_hex("#7A7468", "#948E82", "#5E5A50"),
            old_leaf: ColorTier::from_hex("#507D2A", "#6AA33D", "#3A5A1E"),
            new_sprout: ColorTier::from_hex("#90EE90", "#B8F4B8", "#6BE96B"),
            soil: SoilTier {
                main: hex("#3D2817"),
                light: hex("#523920"),
                dark: hex("#28190E"),
                accent: hex("#4A3020"),
            },
            particle: ColorTier::from_hex("#C8E6C9", "#E8F5E9", "#A5D6A7"),
            pebble: ColorTier::from_hex("#6B6B6B", "#8B8B8B", "#4B4B4B"),
            moss: ColorTier::from_hex("#5D8A4A", "#7CB561", "#4A6E3B"),
            fallen_leaf: hex("#8B7355"),
            snow: hex("#F4F7F8"),
            sign: SignColors {
                board: hex("#8B7355"),
                post: hex("#6B5344"),
                text: hex("#3D2914"),
            },
        }
    }
}

/// Height zones for leaf tiers: dark below `bottom`, light above `middle`,
/// blended across `transition` on either side of each boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafZones {
    pub bottom: f64,
    pub middle: f64,
    pub transition: f64,
}

impl Default for LeafZones {
    fn default() -> Self {
        Self {
            bottom: 0.4,
            middle: 0.7,
            transition: 0.1,
        }
    }
}

/// Span of the young → aged trunk gradient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrunkGradient {
    pub start: f64,
    pub end: f64,
}

impl Default for TrunkGradient {
    fn default() -> Self {
        Self { start: 0.2, end: 0.85 }
    }
}

/// Leaf color for a height ratio, soft-blended between tiers
pub fn leaf_color_by_height(height_ratio: f64, tier: &ColorTier, zones: &LeafZones) -> Rgb {
    let LeafZones { bottom, middle, transition } = *zones;
    let band = transition * 2.0;
    let blend = |from: Rgb, to: Rgb, start: f64| {
        let t = if band > 0.0 { (height_ratio - start) / band } else { 0.5 };
        from.lerp(to, t.clamp(0.0, 1.0))
    };

    if height_ratio < bottom - transition {
        tier.dark
    } else if height_ratio < bottom + transition {
        blend(tier.dark, tier.main, bottom - transition)
    } else if height_ratio < middle - transition {
        tier.main
    } else if height_ratio < middle + transition {
        blend(tier.main, tier.light, middle - transition)
    } else {
        tier.light
    }
}

fn quantize(height_ratio: f64) -> i32 {
    (height_ratio * 100.0).round() as i32
}

/// Trunk tier by height, cached on the ratio rounded to 1%.
///
/// The mapping depends only on the palette, so the cache lives as long as
/// the renderer that owns the palette and is never invalidated.
#[derive(Debug, Default)]
pub struct TrunkColorCache {
    tiers: HashMap<i32, ColorTier>,
}

impl TrunkColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&mut self, height_ratio: f64, palette: &Palette, gradient: &TrunkGradient) -> ColorTier {
        let key = quantize(height_ratio);
        *self.tiers.entry(key).or_insert_with(|| {
            let height_ratio = key as f64 / 100.0;
            let span = gradient.end - gradient.start;
            let t = if height_ratio < gradient.start {
                0.0
            } else if height_ratio > gradient.end {
                1.0
            } else if span > 0.0 {
                (height_ratio - gradient.start) / span
            } else {
                0.5
            };
            palette.trunk_young.lerp(&palette.trunk_aged, t)
        })
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

/// Leaf colors keyed by quantized height and sprout flag; same lifetime rule
/// as [`TrunkColorCache`]
#[derive(Debug, Default)]
pub struct LeafColorCache {
    colors: HashMap<(i32, bool), Rgb>,
}

impl LeafColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color(&mut self, height_ratio: f64, new_sprout: bool, palette: &Palette, zones: &LeafZones) -> Rgb {
        let key = quantize(height_ratio);
        *self.colors.entry((key, new_sprout)).or_insert_with(|| {
            let tier = if new_sprout { &palette.new_sprout } else { &palette.old_leaf };
            leaf_color_by_height(key as f64 / 100.0, tier, zones)
        })
    }
}
