//! Side branches grown by session progress
//!
//! A branch appears the first frame session progress crosses one of the
//! configured thresholds. Its geometry parameters are drawn once, at
//! trigger time, and kept for the rest of the session so branches never
//! jump between frames. Progress returning to 0 starts a new epoch with an
//! empty set.

use crate::config::{BranchConfig, StageDims};
use crate::palette::Rgb;
use crate::raster::{rasterize_line, PixelPoint, Surface};
use crate::rng::SeededRandom;
use crate::trunk::TrunkPoint;

const TRIGGER_SEED_OFFSET: u64 = 501;
const EPOCH_SEED_STRIDE: u64 = 97;
const THRESHOLD_SEED_STRIDE: u64 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Parameters fixed when a threshold is crossed
#[derive(Debug, Clone, PartialEq)]
pub struct SideBranch {
    pub threshold: f64,
    pub attach_ratio: f64,
    pub direction: Direction,
    /// Degrees away from the trunk axis; 90 is horizontal
    pub angle_deg: f64,
    /// Extra degrees the limb sags toward the ground
    pub droop_deg: f64,
    pub base_length: u32,
    pub growth_factor: f64,
}

impl SideBranch {
    /// Final angle from the trunk axis, in degrees. Droop pulls the limb
    /// further from the upward axis, so past 90 the tip hangs below the
    /// attach point.
    pub fn final_angle(&self) -> f64 {
        self.angle_deg + self.droop_deg
    }
}

/// Branches triggered in the current session
#[derive(Debug, Default)]
pub struct TriggeredBranchSet {
    branches: Vec<SideBranch>,
    prev_progress: f64,
    epoch: u64,
}

impl TriggeredBranchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's session progress. Returns how many branches were
    /// triggered by it.
    pub fn observe(&mut self, progress: f64, seed: u64, config: &BranchConfig) -> usize {
        let progress = progress.clamp(0.0, 1.0);
        if progress <= 0.0 {
            if self.prev_progress > 0.0 || !self.branches.is_empty() {
                self.reset();
            }
            return 0;
        }

        let mut added = 0;
        for (index, &threshold) in config.thresholds.iter().enumerate() {
            let crossed = self.prev_progress < threshold && threshold <= progress;
            if crossed && !self.contains(threshold) {
                let branch = self.trigger(index, threshold, seed, config);
                log::debug!(
                    "branch triggered at {:.2}: {:?} attach {:.2}",
                    threshold,
                    branch.direction,
                    branch.attach_ratio
                );
                self.branches.push(branch);
                added += 1;
            }
        }
        self.prev_progress = progress;
        added
    }

    fn contains(&self, threshold: f64) -> bool {
        self.branches.iter().any(|b| b.threshold == threshold)
    }

    fn trigger(&self, index: usize, threshold: f64, seed: u64, config: &BranchConfig) -> SideBranch {
        let stream = seed
            .wrapping_add(TRIGGER_SEED_OFFSET)
            .wrapping_add(self.epoch.wrapping_mul(EPOCH_SEED_STRIDE))
            .wrapping_add(index as u64 * THRESHOLD_SEED_STRIDE);
        let mut rng = SeededRandom::new(stream);

        let attach_ratio = rng.range(config.attach_min, config.attach_max);
        let coin = rng.next_f64();
        let direction = match self.branches.last() {
            None if coin < 0.5 => Direction::Left,
            None => Direction::Right,
            Some(prev) if coin < config.flip_probability => prev.direction.opposite(),
            Some(prev) => prev.direction,
        };
        let angle_deg = rng.range(config.angle_min, config.angle_max);
        let droop_deg = rng.range(config.droop_min, config.droop_max);
        let base_length = config.base_length_min + rng.below(config.base_length_span);

        SideBranch {
            threshold,
            attach_ratio,
            direction,
            angle_deg,
            droop_deg,
            base_length,
            growth_factor: config.growth_factor,
        }
    }

    /// Forget every branch and start a new epoch
    pub fn reset(&mut self) {
        if !self.branches.is_empty() {
            log::debug!("session reset, clearing {} branches", self.branches.len());
        }
        self.branches.clear();
        self.prev_progress = 0.0;
        self.epoch += 1;
    }

    pub fn branches(&self) -> &[SideBranch] {
        &self.branches
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// One branch laid out against the current trunk
#[derive(Debug, Clone, PartialEq)]
pub struct BranchRecord {
    pub attach: PixelPoint,
    pub direction: Direction,
    pub end: PixelPoint,
    pub pixels: Vec<PixelPoint>,
}

pub fn build_branches(
    trunk: &[TrunkPoint],
    set: &TriggeredBranchSet,
    dims: &StageDims,
    config: &BranchConfig,
) -> Vec<BranchRecord> {
    if trunk.len() < config.min_trunk_rows {
        return Vec::new();
    }

    set.branches()
        .iter()
        .map(|branch| {
            let index = ((trunk.len() as f64 * branch.attach_ratio).floor() as usize).min(trunk.len() - 1);
            let anchor = trunk[index];
            let length = (branch.base_length as f64 * branch.growth_factor * dims.branch_length_scale).floor();
            let theta = branch.final_angle().to_radians();

            let dx = branch.direction.sign() * (length * theta.sin()).floor() as i32;
            let rise = (length * theta.cos()).floor() as i32;
            let attach = PixelPoint::new(anchor.x, anchor.y);
            let end = PixelPoint::new(anchor.x + dx, anchor.y - rise);

            BranchRecord {
                attach,
                direction: branch.direction,
                end,
                pixels: rasterize_line(attach.x, attach.y, end.x, end.y),
            }
        })
        .collect()
}

pub fn draw_branches(surface: &mut Surface, branches: &[BranchRecord], color: Rgb) {
    for branch in branches {
        for p in &branch.pixels {
            surface.plot_pixel(p.x as f64, p.y as f64, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StagesConfig;

    fn trunk(rows: i32) -> Vec<TrunkPoint> {
        (0..rows)
            .map(|i| TrunkPoint {
                x: 64,
                y: 159 - i,
                width: 2,
                height_ratio: i as f64 / rows as f64,
                weathered: false,
            })
            .collect()
    }

    #[test]
    fn threshold_crossing_triggers_once() {
        let config = BranchConfig::default();
        let mut set = TriggeredBranchSet::new();
        assert_eq!(set.observe(0.29, 42, &config), 0);
        assert_eq!(set.observe(0.31, 42, &config), 1);
        assert_eq!(set.observe(0.31, 42, &config), 0);
        assert_eq!(set.observe(0.5, 42, &config), 0);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn landing_exactly_on_threshold_counts() {
        let config = BranchConfig::default();
        let mut set = TriggeredBranchSet::new();
        assert_eq!(set.observe(0.3, 42, &config), 1);
    }

    #[test]
    fn jump_crosses_several_thresholds() {
        let config = BranchConfig::default();
        let mut set = TriggeredBranchSet::new();
        assert_eq!(set.observe(0.9, 7, &config), 3);
        assert_eq!(set.observe(1.0, 7, &config), 0);
    }

    #[test]
    fn params_are_fixed_after_trigger() {
        let config = BranchConfig::default();
        let mut set = TriggeredBranchSet::new();
        set.observe(0.65, 3, &config);
        let before = set.branches().to_vec();
        for step in 0..20 {
            set.observe(0.65 + step as f64 * 0.005, 3, &config);
        }
        assert_eq!(&set.branches()[..2], &before[..]);
    }

    #[test]
    fn trigger_params_within_ranges() {
        let config = BranchConfig::default();
        for seed in 0..50 {
            let mut set = TriggeredBranchSet::new();
            set.observe(1.0, seed, &config);
            for b in set.branches() {
                assert!((0.3..=0.7).contains(&b.attach_ratio));
                assert!((80.0..=110.0).contains(&b.final_angle()));
                assert!((5..13).contains(&b.base_length));
            }
        }
    }

    #[test]
    fn return_to_zero_resets_and_advances_epoch() {
        let config = BranchConfig::default();
        let mut set = TriggeredBranchSet::new();
        set.observe(0.7, 11, &config);
        let first = set.branches()[0].clone();
        assert_eq!(set.observe(0.0, 11, &config), 0);
        assert!(set.is_empty());
        assert_eq!(set.epoch(), 1);

        set.observe(0.7, 11, &config);
        assert_eq!(set.len(), 2);
        assert_ne!(set.branches()[0].attach_ratio, first.attach_ratio);
    }

    #[test]
    fn idle_zero_progress_does_not_advance_epoch() {
        let config = BranchConfig::default();
        let mut set = TriggeredBranchSet::new();
        set.observe(0.0, 1, &config);
        set.observe(0.0, 1, &config);
        assert_eq!(set.epoch(), 0);
    }

    #[test]
    fn short_trunk_has_no_branches() {
        let config = BranchConfig::default();
        let dims = StagesConfig::default().growth;
        let mut set = TriggeredBranchSet::new();
        set.observe(1.0, 5, &config);
        assert!(build_branches(&trunk(9), &set, &dims, &config).is_empty());
        assert_eq!(build_branches(&trunk(30), &set, &dims, &config).len(), 3);
    }

    #[test]
    fn branches_are_near_horizontal() {
        let config = BranchConfig::default();
        let dims = StagesConfig::default().ancient;
        for seed in 0..30 {
            let mut set = TriggeredBranchSet::new();
            set.observe(1.0, seed, &config);
            for record in build_branches(&trunk(60), &set, &dims, &config) {
                let dx = (record.end.x - record.attach.x).abs();
                let rise = record.attach.y - record.end.y;
                assert!(dx >= rise.abs(), "branch too steep: dx {} rise {}", dx, rise);
                assert_eq!(record.pixels.first(), Some(&record.attach));
                assert_eq!(record.pixels.last(), Some(&record.end));
                assert_eq!((record.end.x - record.attach.x).signum(), record.direction.sign());
            }
        }
    }

    #[test]
    fn more_droop_lowers_the_tip() {
        let config = BranchConfig::default();
        let dims = StagesConfig::default().growth;
        for angle in [80.0, 90.0] {
            let ends: Vec<i32> = [5.0, 15.0]
                .iter()
                .map(|&droop| {
                    let set = TriggeredBranchSet {
                        branches: vec![SideBranch {
                            threshold: 0.3,
                            attach_ratio: 0.5,
                            direction: Direction::Right,
                            angle_deg: angle,
                            droop_deg: droop,
                            base_length: 20,
                            growth_factor: 0.6,
                        }],
                        prev_progress: 0.3,
                        epoch: 0,
                    };
                    build_branches(&trunk(30), &set, &dims, &config)[0].end.y
                })
                .collect();
            assert!(ends[1] > ends[0], "angle {}: tip ends {:?}", angle, ends);
        }
    }
}
