//! Leaf clusters around the trunk tip, crown pads and branch tips

use crate::branch::BranchRecord;
use crate::config::{FoliageConfig, StageDims};
use crate::palette::{LeafColorCache, Palette, Rgb};
use crate::pot::{POT_CENTER_X, POT_TOP_Y};
use crate::raster::{Surface, CANVAS_WIDTH};
use crate::rng::SeededRandom;
use crate::trunk::TrunkPoint;
use std::f64::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageMark {
    pub x: i32,
    pub y: i32,
    /// 1 for a single pixel, 2 for a 2x2 block
    pub size: u8,
    pub color: Rgb,
    pub height_ratio: f64,
    pub shadow_dir: i32,
    pub new_sprout: bool,
    pub on_branch: bool,
}

/// Everything a foliage pass reads besides the stream itself
pub struct FoliageInput<'a> {
    pub trunk: &'a [TrunkPoint],
    pub branches: &'a [BranchRecord],
    pub dims: &'a StageDims,
    pub config: &'a FoliageConfig,
    pub palette: &'a Palette,
    pub stage_progress: f64,
    pub session_progress: f64,
}

/// Vertical extent used to turn a row into a height ratio
#[derive(Debug, Clone, Copy)]
struct Extent {
    top: i32,
    bottom: i32,
}

impl Extent {
    fn ratio(self, y: i32) -> f64 {
        let span = self.bottom - self.top;
        if span <= 0 {
            return 0.5;
        }
        ((self.bottom - y) as f64 / span as f64).clamp(0.0, 1.0)
    }
}

fn scatter(rng: &mut SeededRandom, radius: f64) -> (i32, i32) {
    let theta = rng.next_f64() * TAU;
    let r = 1.0 + rng.next_f64() * (radius - 1.0);
    ((theta.cos() * r).round() as i32, (theta.sin() * r).round() as i32)
}

/// Smaller marks toward the top of the plant
fn size_by_height(rng: &mut SeededRandom, height_ratio: f64) -> u8 {
    let large = 0.3 + (1.0 - height_ratio) * 0.4;
    if rng.next_f64() < large {
        2
    } else {
        1
    }
}

fn count_in(rng: &mut SeededRandom, range: [u32; 2]) -> u32 {
    range[0] + rng.below(range[1] - range[0] + 1)
}

pub fn generate_foliage(rng: &mut SeededRandom, input: &FoliageInput, colors: &mut LeafColorCache) -> Vec<FoliageMark> {
    let trunk = input.trunk;
    let Some(tip) = trunk.last() else {
        return Vec::new();
    };
    let dims = input.dims;
    let cfg = input.config;
    let extent = Extent {
        top: tip.y - cfg.top_padding,
        bottom: POT_TOP_Y,
    };
    let sprouting = input.session_progress > cfg.sprout_progress;

    // Size is drawn after the caller's sprout draw; keep that order
    let mut mark = |rng: &mut SeededRandom, anchor: (i32, i32), offset: (i32, i32), new_sprout: bool, shadow_dir: i32, on_branch: bool| {
        let y = anchor.1 + offset.1;
        let height_ratio = extent.ratio(y);
        let size = size_by_height(rng, height_ratio);
        FoliageMark {
            x: anchor.0 + offset.0,
            y,
            size,
            color: colors.color(height_ratio, new_sprout, input.palette, &cfg.zones),
            height_ratio,
            shadow_dir,
            new_sprout,
            on_branch,
        }
    };

    let mut marks = Vec::new();
    let tip_count =
        dims.tip_leaves + (input.stage_progress.clamp(0.0, 1.0) * dims.tip_leaves_per_progress as f64).floor() as u32;
    for _ in 0..tip_count {
        let offset = scatter(rng, dims.tip_radius);
        let sprout = sprouting && rng.next_f64() > 0.5;
        let shadow = if offset.0 >= 0 { 1 } else { -1 };
        marks.push(mark(rng, (tip.x, tip.y), offset, sprout, shadow, false));
    }

    for &ratio in &dims.crown_pads {
        let index = ((trunk.len() as f64 * ratio).floor() as usize).min(trunk.len() - 1);
        let anchor = trunk[index];
        for _ in 0..count_in(rng, dims.pad_leaves) {
            let offset = scatter(rng, dims.tip_radius);
            let sprout = sprouting && rng.next_f64() > 0.5;
            let shadow = if offset.0 >= 0 { 1 } else { -1 };
            marks.push(mark(rng, (anchor.x, anchor.y), offset, sprout, shadow, false));
        }
    }

    for branch in input.branches {
        let shadow = if branch.end.x > POT_CENTER_X { 1 } else { -1 };
        for _ in 0..count_in(rng, dims.branch_leaves) {
            let offset = scatter(rng, dims.branch_radius);
            let sprout = rng.next_f64() < cfg.branch_sprout_probability;
            marks.push(mark(rng, (branch.end.x, branch.end.y), offset, sprout, shadow, true));
        }
    }

    enforce_asymmetry(&mut marks);
    marks
}

/// Drop the last mark when an even count splits evenly across the center
pub fn enforce_asymmetry(marks: &mut Vec<FoliageMark>) {
    if marks.len() > 1 && marks.len() % 2 == 0 {
        let left = marks.iter().filter(|m| m.x < CANVAS_WIDTH as i32 / 2).count();
        if left * 2 == marks.len() {
            marks.pop();
        }
    }
}

/// Shadow, body and highlight passes. `sway` gives each mark's horizontal
/// wind offset.
pub fn draw_foliage<F>(surface: &mut Surface, marks: &[FoliageMark], palette: &Palette, highlight_height: f64, sway: F)
where
    F: Fn(&FoliageMark) -> i32,
{
    let tier = |m: &FoliageMark| if m.new_sprout { palette.new_sprout } else { palette.old_leaf };

    for m in marks {
        let dark = tier(m).dark;
        let sx = (m.x + m.shadow_dir + sway(m)) as f64;
        let sy = (m.y + 1) as f64;
        if m.size == 1 {
            surface.plot_pixel(sx, sy, dark);
        } else {
            surface.plot_pixel(sx + 1.0, sy + 1.0, dark);
            surface.plot_pixel(sx, sy + 1.0, dark);
        }
    }

    for m in marks {
        let x = (m.x + sway(m)) as f64;
        if m.size == 1 {
            surface.plot_pixel(x, m.y as f64, m.color);
        } else {
            surface.plot_block(x, m.y as f64, m.color);
        }
    }

    for m in marks.iter().filter(|m| m.size == 2 && m.height_ratio > highlight_height) {
        surface.plot_pixel((m.x + sway(m)) as f64, m.y as f64, tier(m).light);
    }
}
