//! Pot and soil layer
//!
//! Depends only on the render seed, so the renderer keeps it in a
//! [`PotCache`] and re-blits it every frame.

use crate::palette::{Palette, Rgb};
use crate::raster::{should_dither, trapezoid_row_width, DitherMode, Surface, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::rng::SeededRandom;
use image::RgbaImage;

pub const POT_TOP_WIDTH: i32 = 50;
pub const POT_BOTTOM_WIDTH: i32 = 35;
pub const POT_HEIGHT: i32 = 28;
pub const POT_TOP_Y: i32 = CANVAS_HEIGHT as i32 - POT_HEIGHT - 5;
pub const POT_CENTER_X: i32 = CANVAS_WIDTH as i32 / 2;

const DITHER_THRESHOLD: f64 = 0.3;
const DECOR_LINE_ROWS: [i32; 2] = [8, 16];
const DECOR_LINE_INSET: i32 = 8;
const SYMBOL_ROW: i32 = 11;
const SHADOW_ALPHA: f64 = 0.2;

const SOIL_DEPTH: i32 = 3;
const SOIL_INSET: i32 = 6;
const SOIL_SEED_OFFSET: u64 = 999;
const GRAIN_COUNT: u32 = 12;
const MAX_PEBBLES: u32 = 2;
const FALLEN_LEAF_PROBABILITY: f64 = 0.3;
const TRUNK_CLEARANCE: i32 = 4;

const MOSS_COUNT: [u32; 2] = [3, 7];
const MOSS_EDGE_OFFSET: [i32; 2] = [2, 4];
const MOSS_TOP_OFFSET: [i32; 2] = [0, 2];

/// Ensō: an incomplete circle, open on the right
const ENSO: &[&[u8]] = &[
    &[0, 1, 1, 1, 0],
    &[1, 0, 0, 0, 1],
    &[1, 0, 0, 0, 0],
    &[1, 0, 0, 0, 1],
    &[0, 1, 1, 1, 0],
];

const WAVE: &[&[u8]] = &[
    &[0, 1, 1, 0, 1, 1, 0],
    &[1, 0, 0, 1, 0, 0, 1],
    &[0, 0, 0, 0, 0, 0, 0],
];

const MOUNTAIN: &[&[u8]] = &[
    &[0, 0, 1, 0, 0],
    &[0, 1, 0, 1, 0],
    &[1, 0, 0, 0, 1],
    &[0, 0, 0, 0, 0],
];

const ZEN_SYMBOLS: [&[&[u8]]; 3] = [ENSO, WAVE, MOUNTAIN];

/// Draw a 0/1 bitmap with its top-left corner at (x, y)
pub fn draw_pattern(surface: &mut Surface, pattern: &[&[u8]], x: i32, y: i32, color: Rgb) {
    for (row, line) in pattern.iter().enumerate() {
        for (col, &bit) in line.iter().enumerate() {
            if bit == 1 {
                surface.fill_rect(x + col as i32, y + row as i32, 1, 1, color);
            }
        }
    }
}

fn draw_zen_symbol(surface: &mut Surface, cx: i32, cy: i32, index: u64, color: Rgb) {
    let pattern = ZEN_SYMBOLS[(index % ZEN_SYMBOLS.len() as u64) as usize];
    let height = pattern.len() as f64;
    let width = pattern[0].len() as f64;
    let x = (cx as f64 - width / 2.0).floor() as i32;
    let y = (cy as f64 - height / 2.0).floor() as i32;
    draw_pattern(surface, pattern, x, y, color);
}

fn row_width(row: i32) -> i32 {
    trapezoid_row_width(POT_TOP_WIDTH as f64, POT_BOTTOM_WIDTH as f64, POT_HEIGHT, row)
}

fn row_start(row: i32) -> i32 {
    (POT_CENTER_X as f64 - row_width(row) as f64 / 2.0).floor() as i32
}

/// Pot body, rim, decoration, drop shadow and soil bed
pub fn draw_pot(surface: &mut Surface, seed: u64, palette: &Palette, moss: bool) {
    let pot = &palette.pot;
    let cx = POT_CENTER_X;
    let top = POT_TOP_Y;

    surface.fill_trapezoid(cx as f64, top, POT_TOP_WIDTH as f64, POT_BOTTOM_WIDTH as f64, POT_HEIGHT, pot.main);

    // Frosted texture
    for y in 3..POT_HEIGHT - 2 {
        let start = row_start(y);
        for px in start..start + row_width(y) {
            if should_dither(px, top + y, DITHER_THRESHOLD, DitherMode::Ordered) {
                surface.fill_rect(px, top + y, 1, 1, pot.dark);
            }
        }
    }

    // Lit left edge, two pixels wide on the upper half
    for y in 1..POT_HEIGHT - 1 {
        let left = row_start(y);
        surface.fill_rect(left, top + y, 1, 1, pot.light);
        if (y as f64) < POT_HEIGHT as f64 / 2.0 {
            surface.fill_rect(left + 1, top + y, 1, 1, pot.light);
        }
    }

    // Shaded lower right edge
    for y in POT_HEIGHT / 2..POT_HEIGHT - 1 {
        let right = (cx as f64 + row_width(y) as f64 / 2.0).floor() as i32 - 1;
        surface.fill_rect(right, top + y, 1, 1, pot.dark);
    }

    let rim_width = POT_TOP_WIDTH - 2;
    let rim_x = (cx as f64 - rim_width as f64 / 2.0).floor() as i32;
    surface.fill_rect(rim_x, top, rim_width, 1, pot.light);

    for row in DECOR_LINE_ROWS {
        let width = row_width(row) - DECOR_LINE_INSET;
        let x = (cx as f64 - width as f64 / 2.0).floor() as i32;
        surface.fill_rect(x, top + row, width, 1, pot.light);
    }

    draw_zen_symbol(surface, cx, top + SYMBOL_ROW, seed, pot.light);

    let shadow_width = POT_BOTTOM_WIDTH + 4;
    let shadow_x = (cx as f64 - shadow_width as f64 / 2.0).floor();
    surface.fill_rect_alpha(shadow_x, (top + POT_HEIGHT) as f64, shadow_width as f64, 2.0, Rgb::BLACK, SHADOW_ALPHA);

    let mut rng = SeededRandom::new(seed.wrapping_add(SOIL_SEED_OFFSET));
    draw_soil(surface, &mut rng, palette, cx, top + 1, POT_TOP_WIDTH - SOIL_INSET, moss);
}

fn draw_soil(surface: &mut Surface, rng: &mut SeededRandom, palette: &Palette, cx: i32, top_y: i32, width: i32, moss: bool) {
    let soil = &palette.soil;
    let pebble = &palette.pebble;
    let start_x = (cx as f64 - width as f64 / 2.0).floor() as i32;

    surface.fill_rect(start_x, top_y, width, SOIL_DEPTH, soil.main);
    surface.fill_rect(start_x, top_y + SOIL_DEPTH - 1, width, 1, soil.dark);

    for _ in 0..GRAIN_COUNT {
        let px = start_x + 1 + rng.below((width - 2) as u32) as i32;
        let py = top_y + rng.below((SOIL_DEPTH - 1) as u32) as i32;
        let pick = rng.next_f64();
        let color = if pick < 0.3 {
            soil.light
        } else if pick < 0.6 {
            soil.dark
        } else if pick < 0.7 {
            soil.accent
        } else {
            continue;
        };
        surface.fill_rect(px, py, 1, 1, color);
    }

    // Pebbles keep mostly clear of the trunk base
    let pebbles = rng.below(MAX_PEBBLES + 1);
    for _ in 0..pebbles {
        let px = loop {
            let px = start_x + 2 + rng.below((width - 4) as u32) as i32;
            if (px - cx).abs() >= TRUNK_CLEARANCE || rng.next_f64() <= 0.3 {
                break px;
            }
        };
        let py = top_y + rng.below(2) as i32;
        let color = if rng.next_f64() > 0.5 { pebble.light } else { pebble.main };
        surface.fill_rect(px, py, 1, 1, color);
        if rng.next_f64() > 0.5 {
            surface.fill_rect(px + 1, py, 1, 1, pebble.dark);
        }
    }

    if rng.next_f64() < FALLEN_LEAF_PROBABILITY {
        let count = 1 + rng.below(2);
        for _ in 0..count {
            let lx = start_x + 3 + rng.below((width - 6) as u32) as i32;
            surface.fill_rect(lx, top_y, 1, 1, palette.fallen_leaf);
        }
    }

    if moss {
        for patch in generate_moss(rng, palette, start_x, top_y, width) {
            surface.fill_rect(patch.x, patch.y, patch.size, patch.size, patch.color);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MossPatch {
    pub x: i32,
    pub y: i32,
    pub size: i32,
    pub color: Rgb,
}

/// Moss clusters hugging both soil edges, weighted to the left
pub fn generate_moss(rng: &mut SeededRandom, palette: &Palette, start_x: i32, top_y: i32, width: i32) -> Vec<MossPatch> {
    let edge_span = (MOSS_EDGE_OFFSET[1] - MOSS_EDGE_OFFSET[0]) as u32;
    let left_edge = start_x + MOSS_EDGE_OFFSET[0] + rng.below(edge_span) as i32;
    let right_edge = start_x + width - MOSS_EDGE_OFFSET[0] - rng.below(edge_span) as i32;

    let count = MOSS_COUNT[0] + rng.below(MOSS_COUNT[1] - MOSS_COUNT[0] + 1);
    let mut patches = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let base = if rng.next_f64() < 0.6 { left_edge } else { right_edge };
        let x = base + rng.below(3) as i32 - 1;
        let y = top_y + MOSS_TOP_OFFSET[0] + rng.below((MOSS_TOP_OFFSET[1] - MOSS_TOP_OFFSET[0] + 1) as u32) as i32;

        let pick = rng.next_f64();
        let color = if pick < 0.7 {
            palette.moss.main
        } else if pick < 0.9 {
            palette.moss.light
        } else {
            palette.moss.dark
        };
        let size = if rng.next_f64() < 0.8 { 1 } else { 2 };

        patches.push(MossPatch { x, y, size, color });
    }

    patches
}

/// Pre-rendered pot layer, rebuilt only when the render seed changes
pub struct PotCache {
    seed: Option<u64>,
    layer: RgbaImage,
    builds: u64,
}

impl Default for PotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PotCache {
    pub fn new() -> Self {
        Self {
            seed: None,
            layer: RgbaImage::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            builds: 0,
        }
    }

    pub fn layer(&mut self, seed: u64, palette: &Palette, moss: bool) -> &RgbaImage {
        if self.seed != Some(seed) {
            let mut surface = Surface::default();
            draw_pot(&mut surface, seed, palette, moss);
            self.layer = surface.into_image();
            self.seed = Some(seed);
            self.builds += 1;
            log::debug!("pot cache rebuilt for seed {}", seed);
        }
        &self.layer
    }

    pub fn invalidate(&mut self) {
        self.seed = None;
    }

    /// How many times the layer has been regenerated
    pub fn builds(&self) -> u64 {
        self.builds
    }
}
