//! Tunable constants, loaded from `config.toml`
//!
//! Every section falls back to built-in defaults, so a partial file only
//! needs the values it overrides. A file that exists but fails to parse or
//! validate is an error: malformed stage thresholds must be caught here and
//! not per frame.

use crate::error::{PlantError, Result};
use crate::palette::{LeafZones, Palette, TrunkGradient};
use crate::raster::CANVAS_WIDTH;
use crate::stage::{Stage, STAGE_COUNT};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timer: TimerConfig,
    pub plant: PlantConfig,
}

/// Focus timer durations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub work_mins: u32,
    pub short_break_mins: u32,
    pub long_break_mins: u32,
    pub sessions_until_long: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_mins: 25,
            short_break_mins: 5,
            long_break_mins: 15,
            sessions_until_long: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Added to the growth count to form the render seed
    pub base_seed: u64,
    pub stages: StagesConfig,
    pub trunk: TrunkConfig,
    pub branches: BranchConfig,
    pub foliage: FoliageConfig,
    pub wind: WindConfig,
    pub pulse: PulseConfig,
    pub particles: ParticleConfig,
    pub palette: Palette,
    pub accessories: AccessoryConfig,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            base_seed: 12345,
            stages: StagesConfig::default(),
            trunk: TrunkConfig::default(),
            branches: BranchConfig::default(),
            foliage: FoliageConfig::default(),
            wind: WindConfig::default(),
            pulse: PulseConfig::default(),
            particles: ParticleConfig::default(),
            palette: Palette::default(),
            accessories: AccessoryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    /// Growth counts at which each stage begins; strictly increasing from 0
    pub thresholds: Vec<u32>,
    /// Synthetic span of the last stage so its progress keeps moving
    pub terminal_span: f64,
    pub seedling: StageDims,
    pub growth: StageDims,
    pub mature: StageDims,
    pub ancient: StageDims,
}

impl Default for StagesConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0, 1, 3, 8],
            terminal_span: 8.0,
            seedling: StageDims {
                base_height: 12,
                max_height: 24,
                amplitude: 2.0,
                frequency: 1.0,
                jitter_amount: 1,
                widths: vec![1, 1, 1],
                tip_leaves: 2,
                tip_leaves_per_progress: 4,
                tip_radius: 3.0,
                crown_pads: Vec::new(),
                pad_leaves: [0, 0],
                branch_leaves: [1, 2],
                branch_radius: 3.0,
                branch_length_scale: 1.0,
                weathering: 0.0,
            },
            growth: StageDims {
                base_height: 20,
                max_height: 44,
                amplitude: 3.0,
                frequency: 1.5,
                jitter_amount: 1,
                widths: vec![2, 2, 1],
                tip_leaves: 2,
                tip_leaves_per_progress: 6,
                tip_radius: 3.0,
                crown_pads: Vec::new(),
                pad_leaves: [0, 0],
                branch_leaves: [1, 2],
                branch_radius: 3.0,
                branch_length_scale: 1.0,
                weathering: 0.0,
            },
            mature: StageDims {
                base_height: 36,
                max_height: 64,
                amplitude: 5.0,
                frequency: 2.0,
                jitter_amount: 2,
                widths: vec![2, 2, 1],
                tip_leaves: 4,
                tip_leaves_per_progress: 6,
                tip_radius: 4.0,
                crown_pads: vec![0.8],
                pad_leaves: [2, 4],
                branch_leaves: [2, 3],
                branch_radius: 3.0,
                branch_length_scale: 1.4,
                weathering: 0.0,
            },
            ancient: StageDims {
                base_height: 56,
                max_height: 84,
                amplitude: 7.0,
                frequency: 2.0,
                jitter_amount: 2,
                widths: vec![4, 3, 3, 2, 1],
                tip_leaves: 6,
                tip_leaves_per_progress: 6,
                tip_radius: 5.0,
                crown_pads: vec![0.72, 0.88],
                pad_leaves: [3, 5],
                branch_leaves: [2, 4],
                branch_radius: 4.0,
                branch_length_scale: 1.8,
                weathering: 0.12,
            },
        }
    }
}

impl StagesConfig {
    pub fn dims(&self, stage: Stage) -> &StageDims {
        match stage {
            Stage::Seedling => &self.seedling,
            Stage::Growth => &self.growth,
            Stage::Mature => &self.mature,
            Stage::Ancient => &self.ancient,
        }
    }
}

/// Per-stage morphology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDims {
    /// Trunk rows at stage progress 0
    pub base_height: u32,
    /// Trunk rows at stage progress 1
    pub max_height: u32,
    pub amplitude: f64,
    /// Sine periods over the trunk height
    pub frequency: f64,
    pub jitter_amount: i32,
    /// Trunk width bands from base to tip, each covering an equal share
    pub widths: Vec<u32>,
    pub tip_leaves: u32,
    pub tip_leaves_per_progress: u32,
    pub tip_radius: f64,
    /// Extra foliage clusters at these trunk height ratios
    pub crown_pads: Vec<f64>,
    /// Inclusive [min, max] marks per crown pad
    pub pad_leaves: [u32; 2],
    /// Inclusive [min, max] marks per branch tip
    pub branch_leaves: [u32; 2],
    pub branch_radius: f64,
    pub branch_length_scale: f64,
    /// Chance that a trunk row shows grey weathered bark
    pub weathering: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrunkConfig {
    pub jitter_interval: u32,
    pub phase_range: f64,
    pub growth_bonus_per_session: u32,
    pub growth_bonus_max: u32,
    /// Bottom share of the trunk that flares toward the pot
    pub thickening_zone: f64,
    pub thickening_amount: f64,
    pub min_height_for_thickening: u32,
    /// Rows kept free above the trunk tip for foliage
    pub top_margin: i32,
    /// Columns kept free on either side of the canvas
    pub side_margin: i32,
    pub gradient: TrunkGradient,
}

impl Default for TrunkConfig {
    fn default() -> Self {
        Self {
            jitter_interval: 6,
            phase_range: std::f64::consts::PI,
            growth_bonus_per_session: 2,
            growth_bonus_max: 20,
            thickening_zone: 0.2,
            thickening_amount: 1.0,
            min_height_for_thickening: 15,
            top_margin: 16,
            side_margin: 10,
            gradient: TrunkGradient::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchConfig {
    /// Session progress values that each grow one side branch
    pub thresholds: Vec<f64>,
    pub attach_min: f64,
    pub attach_max: f64,
    pub growth_factor: f64,
    pub angle_min: f64,
    pub angle_max: f64,
    pub droop_min: f64,
    pub droop_max: f64,
    /// Chance a new branch takes the opposite side of the previous one
    pub flip_probability: f64,
    pub base_length_min: u32,
    pub base_length_span: u32,
    /// Trunks shorter than this grow no branches
    pub min_trunk_rows: usize,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0.3, 0.6, 0.85],
            attach_min: 0.3,
            attach_max: 0.7,
            growth_factor: 0.6,
            angle_min: 75.0,
            angle_max: 95.0,
            droop_min: 5.0,
            droop_max: 15.0,
            flip_probability: 0.7,
            base_length_min: 5,
            base_length_span: 8,
            min_trunk_rows: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoliageConfig {
    pub zones: LeafZones,
    /// Foliage extent reaches this many rows above the trunk tip
    pub top_padding: i32,
    /// Session progress after which tip marks may be fresh sprouts
    pub sprout_progress: f64,
    pub branch_sprout_probability: f64,
    /// Height ratio above which 2x2 marks get a highlight pixel
    pub highlight_height: f64,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            zones: LeafZones::default(),
            top_padding: 5,
            sprout_progress: 0.7,
            branch_sprout_probability: 0.6,
            highlight_height: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    pub amplitude: f64,
    pub frequency: f64,
    /// Top share of the plant that sways
    pub affected_height: f64,
    pub branch_multiplier: f64,
    /// Animation clock advance per rendered frame while running
    pub frame_ms: f64,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            amplitude: 1.5,
            frequency: 0.002,
            affected_height: 0.3,
            branch_multiplier: 1.2,
            frame_ms: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub interval_ms: u64,
    pub duration_ms: u64,
    pub scale_max: f64,
    pub scale_min: f64,
    pub on_stage_change: bool,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            duration_ms: 600,
            scale_max: 1.03,
            scale_min: 0.98,
            on_stage_change: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub max_count: usize,
    pub spawn_probability: f64,
    pub base_opacity: f64,
    pub rise_speed: f64,
    pub life_min: f64,
    pub life_max: f64,
    pub drift_amplitude: f64,
    pub drift_frequency: f64,
    /// Horizontal spawn spread around the trunk base
    pub spread: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_count: 15,
            spawn_probability: 0.03,
            base_opacity: 0.6,
            rise_speed: 0.3,
            life_min: 60.0,
            life_max: 120.0,
            drift_amplitude: 0.5,
            drift_frequency: 0.05,
            spread: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessoryConfig {
    pub sign_board: bool,
    pub moss: bool,
    pub snow: bool,
    /// Chance an upper foliage mark carries a snow cap
    pub snow_density: f64,
}

impl Default for AccessoryConfig {
    fn default() -> Self {
        Self {
            sign_board: true,
            moss: true,
            snow: false,
            snow_density: 0.35,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml(&content)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pixelbonsai")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.timer.work_mins == 0 || self.timer.sessions_until_long == 0 {
            return Err(PlantError::config("timer durations and long-break interval must be positive"));
        }
        self.plant.validate()
    }
}

impl PlantConfig {
    pub fn validate(&self) -> Result<()> {
        let t = &self.stages.thresholds;
        if t.len() != STAGE_COUNT {
            return Err(PlantError::config(format!(
                "expected {} stage thresholds, got {}",
                STAGE_COUNT,
                t.len()
            )));
        }
        if t[0] != 0 {
            return Err(PlantError::config("first stage threshold must be 0"));
        }
        if t.windows(2).any(|w| w[0] >= w[1]) {
            return Err(PlantError::config(format!("stage thresholds must be strictly increasing: {:?}", t)));
        }
        if !(self.stages.terminal_span > 0.0) {
            return Err(PlantError::config("terminal_span must be positive"));
        }

        for (name, dims) in [
            ("seedling", &self.stages.seedling),
            ("growth", &self.stages.growth),
            ("mature", &self.stages.mature),
            ("ancient", &self.stages.ancient),
        ] {
            if dims.widths.is_empty() {
                return Err(PlantError::config(format!("stage {} needs at least one width band", name)));
            }
            if dims.base_height > dims.max_height {
                return Err(PlantError::config(format!("stage {} base_height exceeds max_height", name)));
            }
            if dims.pad_leaves[0] > dims.pad_leaves[1] || dims.branch_leaves[0] > dims.branch_leaves[1] {
                return Err(PlantError::config(format!("stage {} leaf ranges must be [min, max]", name)));
            }
        }

        let b = &self.branches;
        if b.thresholds.windows(2).any(|w| w[0] >= w[1])
            || b.thresholds.iter().any(|&v| !(v > 0.0 && v <= 1.0))
        {
            return Err(PlantError::config("branch thresholds must be ascending within (0, 1]"));
        }
        if b.attach_min > b.attach_max || b.angle_min > b.angle_max || b.droop_min > b.droop_max {
            return Err(PlantError::config("branch ranges must be [min, max]"));
        }

        let p = &self.pulse;
        if p.duration_ms == 0 || p.scale_min > 1.0 || p.scale_max < 1.0 {
            return Err(PlantError::config("pulse needs a positive duration and scale_min <= 1 <= scale_max"));
        }

        if !(self.wind.affected_height > 0.0 && self.wind.affected_height <= 1.0) {
            return Err(PlantError::config("wind affected_height must be within (0, 1]"));
        }

        let pc = &self.particles;
        if pc.life_min <= 0.0 || pc.life_min > pc.life_max {
            return Err(PlantError::config("particle life range must be positive [min, max]"));
        }

        let tr = &self.trunk;
        if tr.jitter_interval == 0 {
            return Err(PlantError::config("trunk jitter_interval must be positive"));
        }
        // Widest row the trunk can draw, flare included, must fit between the margins
        let widest_band = Stage::ALL
            .iter()
            .flat_map(|&stage| self.stages.dims(stage).widths.iter().copied())
            .max()
            .unwrap_or(1);
        let widest = (widest_band as f64 + tr.thickening_amount.max(0.0)).round() as i64;
        if tr.side_margin < 0 || 2 * tr.side_margin as i64 + widest > CANVAS_WIDTH as i64 {
            return Err(PlantError::config(format!(
                "trunk side_margin {} leaves no room for a {}px trunk on a {}px canvas",
                tr.side_margin, widest, CANVAS_WIDTH
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [timer]
            work_mins = 50

            [plant.wind]
            amplitude = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(config.timer.work_mins, 50);
        assert_eq!(config.timer.short_break_mins, 5);
        assert_eq!(config.plant.wind.amplitude, 2.5);
        assert_eq!(config.plant.stages.thresholds, vec![0, 1, 3, 8]);
    }

    #[test]
    fn non_increasing_thresholds_fail_fast() {
        let err = Config::from_toml("[plant.stages]\nthresholds = [0, 3, 3, 8]\n").unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn thresholds_must_start_at_zero() {
        assert!(Config::from_toml("[plant.stages]\nthresholds = [1, 3, 5, 8]\n").is_err());
    }

    #[test]
    fn wrong_threshold_count_is_rejected() {
        assert!(Config::from_toml("[plant.stages]\nthresholds = [0, 1, 3]\n").is_err());
    }

    #[test]
    fn trunk_margins_must_leave_room() {
        let err = Config::from_toml("[plant.trunk]\nside_margin = 70\n").unwrap_err();
        assert!(err.to_string().contains("side_margin"));
        assert!(Config::from_toml("[plant.trunk]\nside_margin = -1\n").is_err());

        // A band too wide for the space between otherwise valid margins
        let mut config = PlantConfig::default();
        config.trunk.side_margin = 50;
        config.stages.ancient.widths = vec![30, 3, 1];
        assert!(config.validate().is_err());
        config.stages.ancient.widths = vec![20, 3, 1];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_palette_color_is_rejected() {
        assert!(Config::from_toml("[plant.palette]\nfallen_leaf = \"brown\"\n").is_err());
    }

    #[test]
    fn palette_color_override() {
        let config = Config::from_toml("[plant.palette]\nsnow = \"#ffffff\"\n").unwrap();
        assert_eq!(config.plant.palette.snow.to_hex(), "#ffffff");
    }

    #[test]
    fn toml_round_trip_of_defaults() {
        let text = Config::default().to_toml().unwrap();
        let back = Config::from_toml(&text).unwrap();
        assert_eq!(back.plant.stages.thresholds, vec![0, 1, 3, 8]);
        assert_eq!(back.plant.palette, Palette::default());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("pixelbonsai-does-not-exist.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.timer.work_mins, 25);
    }
}
