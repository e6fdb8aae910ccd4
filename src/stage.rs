//! Growth count → morphological stage

use crate::config::StagesConfig;
use crate::error::{PlantError, Result};
use std::fmt;

pub const STAGE_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Seedling,
    Growth,
    Mature,
    Ancient,
}

impl Stage {
    pub const ALL: [Stage; STAGE_COUNT] = [Stage::Seedling, Stage::Growth, Stage::Mature, Stage::Ancient];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(i: usize) -> Stage {
        Self::ALL[i.min(STAGE_COUNT - 1)]
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Seedling => "Seedling",
            Stage::Growth => "Growth",
            Stage::Mature => "Mature",
            Stage::Ancient => "Ancient",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Validated stage thresholds
#[derive(Debug, Clone)]
pub struct StageTable {
    thresholds: [u32; STAGE_COUNT],
    terminal_span: f64,
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            thresholds: [0, 1, 3, 8],
            terminal_span: 8.0,
        }
    }
}

impl StageTable {
    pub fn new(thresholds: &[u32], terminal_span: f64) -> Result<Self> {
        let thresholds: [u32; STAGE_COUNT] = thresholds
            .try_into()
            .map_err(|_| PlantError::config(format!("expected {} stage thresholds", STAGE_COUNT)))?;
        if thresholds[0] != 0 || thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PlantError::config(format!(
                "stage thresholds must start at 0 and strictly increase: {:?}",
                thresholds
            )));
        }
        Ok(Self {
            thresholds,
            terminal_span,
        })
    }

    pub fn from_config(config: &StagesConfig) -> Result<Self> {
        Self::new(&config.thresholds, config.terminal_span)
    }

    pub fn thresholds(&self) -> &[u32; STAGE_COUNT] {
        &self.thresholds
    }

    /// Last stage whose threshold is at or below `total_growth`
    pub fn stage(&self, total_growth: u32) -> Stage {
        let reached = self.thresholds.iter().filter(|&&t| t <= total_growth).count();
        Stage::from_index(reached.saturating_sub(1))
    }

    /// Position of `total_growth + session_progress` within the current
    /// stage, in [0, 1]
    pub fn progress(&self, total_growth: u32, session_progress: f64) -> f64 {
        let i = self.stage(total_growth).index();
        let lo = self.thresholds[i] as f64;
        let hi = if i + 1 < STAGE_COUNT {
            self.thresholds[i + 1] as f64
        } else {
            lo + self.terminal_span
        };
        let span = hi - lo;
        if span <= 0.0 {
            return 0.5;
        }
        let position = total_growth as f64 + session_progress.clamp(0.0, 1.0) - lo;
        (position / span).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_growth_is_first_stage() {
        let table = StageTable::default();
        assert_eq!(table.stage(0), Stage::Seedling);
        assert_eq!(table.progress(0, 0.0), 0.0);
    }

    #[test]
    fn threshold_is_inclusive_lower_bound() {
        let table = StageTable::default();
        assert_eq!(table.stage(1), Stage::Growth);
        assert_eq!(table.stage(2), Stage::Growth);
        assert_eq!(table.stage(3), Stage::Mature);
        assert_eq!(table.stage(8), Stage::Ancient);
        assert_eq!(table.stage(10_000), Stage::Ancient);
    }

    #[test]
    fn stage_is_monotonic() {
        let table = StageTable::default();
        let mut prev = table.stage(0);
        for g in 1..200 {
            let s = table.stage(g);
            assert!(s >= prev);
            prev = s;
        }
    }

    #[test]
    fn progress_within_stage() {
        let table = StageTable::default();
        // Growth spans 1..3
        assert_eq!(table.progress(1, 0.0), 0.0);
        assert_eq!(table.progress(2, 0.0), 0.5);
        assert_eq!(table.progress(2, 0.5), 0.75);
        // Seedling spans 0..1, so session progress maps straight through
        assert_eq!(table.progress(0, 0.25), 0.25);
    }

    #[test]
    fn terminal_stage_uses_synthetic_span() {
        let table = StageTable::default();
        assert_eq!(table.progress(8, 0.0), 0.0);
        assert_eq!(table.progress(12, 0.0), 0.5);
        assert_eq!(table.progress(40, 0.0), 1.0);
    }

    #[test]
    fn malformed_thresholds_are_rejected() {
        assert!(StageTable::new(&[0, 2, 2, 5], 8.0).is_err());
        assert!(StageTable::new(&[1, 2, 3, 5], 8.0).is_err());
        assert!(StageTable::new(&[0, 1, 3], 8.0).is_err());
        assert!(StageTable::new(&[0, 2, 4, 9], 8.0).is_ok());
    }
}
