//! Wind sway for the upper foliage

use crate::config::WindConfig;

/// Animation clock driving the sway. Only advances while the timer runs,
/// so a paused plant holds its pose.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindClock {
    time_ms: f64,
    active: bool,
}

impl WindClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set this frame's activity and step the clock one frame if active
    pub fn tick(&mut self, running: bool, reduced_motion: bool, config: &WindConfig) {
        self.active = running && !reduced_motion;
        if running {
            self.time_ms += config.frame_ms;
        }
    }

    pub fn offset(&self, height_ratio: f64, on_branch: bool, config: &WindConfig) -> i32 {
        if !self.active {
            return 0;
        }
        wind_offset(height_ratio, self.time_ms, on_branch, config)
    }
}

/// Horizontal sway in pixels. Zero below the affected band; inside it the
/// weight grows quadratically toward the top.
pub fn wind_offset(height_ratio: f64, time_ms: f64, on_branch: bool, config: &WindConfig) -> i32 {
    let threshold = 1.0 - config.affected_height;
    if height_ratio < threshold || config.affected_height <= 0.0 {
        return 0;
    }
    let above = (height_ratio - threshold) / config.affected_height;
    let weight = above * above;

    let mut offset = (time_ms * config.frequency).sin() * config.amplitude * weight;
    if on_branch {
        offset *= config.branch_multiplier;
    }
    offset.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    // sin(785.4 * 0.002) is ~1, the peak of the sway
    const PEAK_MS: f64 = 785.398;

    #[test]
    fn lower_plant_is_still() {
        let config = WindConfig::default();
        for h in [0.0, 0.3, 0.69] {
            assert_eq!(wind_offset(h, PEAK_MS, true, &config), 0);
        }
    }

    #[test]
    fn top_sways_by_amplitude() {
        let config = WindConfig {
            amplitude: 3.0,
            ..WindConfig::default()
        };
        assert_eq!(wind_offset(1.0, PEAK_MS, false, &config), 3);
        // 3.0 * 1.2 = 3.6
        assert_eq!(wind_offset(1.0, PEAK_MS, true, &config), 4);
        assert_eq!(wind_offset(1.0, -PEAK_MS, false, &config), -3);
        // Weight 0.09 near the bottom of the band
        assert_eq!(wind_offset(0.79, PEAK_MS, false, &config), 0);
    }

    #[test]
    fn sway_is_bounded() {
        let config = WindConfig::default();
        let bound = (config.amplitude * config.branch_multiplier).round() as i32;
        for step in 0..2000 {
            let t = step as f64 * 16.0;
            assert!(wind_offset(1.0, t, true, &config).abs() <= bound);
        }
    }

    #[test]
    fn idle_or_reduced_motion_is_zero() {
        let config = WindConfig::default();
        let mut clock = WindClock::new();
        for _ in 0..49 {
            clock.tick(true, false, &config);
        }
        assert!(clock.offset(1.0, false, &config) != 0);

        clock.tick(true, true, &config);
        assert_eq!(clock.offset(1.0, true, &config), 0);

        let before = clock.time_ms();
        clock.tick(false, false, &config);
        assert_eq!(clock.offset(1.0, true, &config), 0);
        assert_eq!(clock.time_ms(), before);
    }
}
