//! Trunk centerline generation
//!
//! Each stage maps to a generator function through a fixed table. Early
//! stages grow a tapered S-curve; the last stage grows a gnarled path with
//! weathered bark. Generators only read the stream in a fixed order, so a
//! seed and progress value always give the same trunk.

use crate::config::{StageDims, TrunkConfig};
use crate::palette::{Palette, TrunkColorCache, TrunkGradient};
use crate::pot::{POT_CENTER_X, POT_TOP_Y};
use crate::raster::{Surface, CANVAS_WIDTH};
use crate::rng::SeededRandom;
use crate::stage::{Stage, STAGE_COUNT};
use std::f64::consts::TAU;

/// One row of the trunk, base first
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrunkPoint {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height_ratio: f64,
    pub weathered: bool,
}

pub struct TrunkParams<'a> {
    pub dims: &'a StageDims,
    pub trunk: &'a TrunkConfig,
    pub stage_progress: f64,
    pub total_growth: u32,
}

type TrunkGenerator = fn(&mut SeededRandom, &TrunkParams) -> Vec<TrunkPoint>;

const GENERATORS: [TrunkGenerator; STAGE_COUNT] = [curved_trunk, curved_trunk, curved_trunk, gnarled_trunk];

pub fn generate_trunk(stage: Stage, rng: &mut SeededRandom, params: &TrunkParams) -> Vec<TrunkPoint> {
    GENERATORS[stage.index()](rng, params)
}

/// Rows of trunk for the current progress, limited to the drawable area
pub fn trunk_height(params: &TrunkParams) -> u32 {
    let dims = params.dims;
    let t = params.trunk;
    let span = dims.max_height.saturating_sub(dims.base_height) as f64;
    let bonus = params
        .total_growth
        .saturating_mul(t.growth_bonus_per_session)
        .min(t.growth_bonus_max) as f64;
    let height = (dims.base_height as f64 + span * params.stage_progress.clamp(0.0, 1.0) + bonus).floor();
    let limit = (POT_TOP_Y - t.top_margin).max(0) as f64;
    height.min(limit).max(0.0) as u32
}

fn phase(params: &TrunkParams) -> f64 {
    (params.total_growth % 10) as f64 * (params.trunk.phase_range / 10.0)
}

/// Width from the stage's bands, plus a flare near the pot on tall trunks
pub fn trunk_width(height_ratio: f64, total_height: u32, dims: &StageDims, trunk: &TrunkConfig) -> u32 {
    let bands = dims.widths.len().max(1);
    let band = ((height_ratio * bands as f64).floor() as usize).min(bands - 1);
    let base = dims.widths.get(band).copied().unwrap_or(1) as f64;

    if height_ratio < trunk.thickening_zone && total_height >= trunk.min_height_for_thickening {
        let blend = height_ratio / trunk.thickening_zone;
        return (base + trunk.thickening_amount * (1.0 - blend)).round() as u32;
    }
    base as u32
}

fn jitter(rng: &mut SeededRandom, row: u32, params: &TrunkParams) -> i32 {
    if row > 0 && row % params.trunk.jitter_interval == 0 {
        (rng.below(3) as i32 - 1) * params.dims.jitter_amount
    } else {
        0
    }
}

fn curved_trunk(rng: &mut SeededRandom, params: &TrunkParams) -> Vec<TrunkPoint> {
    let height = trunk_height(params);
    let dims = params.dims;
    let margin = params.trunk.side_margin;
    let phase = phase(params);

    let mut points = Vec::with_capacity(height as usize);
    for i in 0..height {
        let height_ratio = i as f64 / height as f64;
        let curve = (dims.amplitude * (height_ratio * dims.frequency * TAU + phase).sin()).round() as i32;
        let offset = curve + jitter(rng, i, params);
        let x = (POT_CENTER_X + offset).clamp(margin, CANVAS_WIDTH as i32 - margin);

        points.push(TrunkPoint {
            x,
            y: POT_TOP_Y - i as i32,
            width: trunk_width(height_ratio, height, dims, params.trunk),
            height_ratio,
            weathered: false,
        });
    }
    points
}

fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn gnarled_trunk(rng: &mut SeededRandom, params: &TrunkParams) -> Vec<TrunkPoint> {
    let height = trunk_height(params);
    let dims = params.dims;
    let margin = params.trunk.side_margin;
    let phase = phase(params);

    // Zig-zag control offsets, one per segment boundary
    let segments = 3 + rng.below(3) as usize;
    let mut side = if rng.next_f64() < 0.5 { -1.0 } else { 1.0 };
    let mut controls = Vec::with_capacity(segments + 1);
    controls.push(0.0);
    for _ in 0..segments {
        controls.push(side * dims.amplitude * rng.range(0.4, 1.0));
        side = -side;
    }

    let mut points = Vec::with_capacity(height as usize);
    for i in 0..height {
        let height_ratio = i as f64 / height as f64;
        let pos = height_ratio * segments as f64;
        let k = (pos.floor() as usize).min(segments - 1);
        let blend = smoothstep(pos - k as f64);
        let bend = controls[k] + (controls[k + 1] - controls[k]) * blend;
        let ripple = (height_ratio * dims.frequency * TAU + phase).sin();
        let offset = (bend + ripple).round() as i32 + jitter(rng, i, params);
        let weathered = rng.next_f64() < dims.weathering;

        let width = trunk_width(height_ratio, height, dims, params.trunk);
        let half = (width as i32 - 1) / 2;
        let x = (POT_CENTER_X + offset).clamp(margin + half, CANVAS_WIDTH as i32 - margin - width as i32 + half);

        points.push(TrunkPoint {
            x,
            y: POT_TOP_Y - i as i32,
            width,
            height_ratio,
            weathered,
        });
    }
    points
}

pub fn draw_trunk(
    surface: &mut Surface,
    points: &[TrunkPoint],
    cache: &mut TrunkColorCache,
    palette: &Palette,
    gradient: &TrunkGradient,
) {
    for p in points {
        let tier = if p.weathered {
            palette.weathered
        } else {
            cache.tier(p.height_ratio, palette, gradient)
        };
        let w = p.width.max(1) as i32;
        let left = p.x - (w - 1) / 2;

        for i in 0..w {
            let color = if i == w - 1 && w >= 2 && p.height_ratio < 0.5 {
                tier.dark
            } else if i == 0 && w >= 3 {
                tier.light
            } else {
                tier.main
            };
            surface.plot_pixel((left + i) as f64, p.y as f64, color);
        }

        if p.height_ratio < 0.1 && w >= 2 {
            surface.plot_pixel((left - 1) as f64, p.y as f64, tier.dark);
        }
    }
}
