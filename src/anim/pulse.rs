//! Growth pulse: a short swell and settle of the whole plant

use crate::config::PulseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulsePhase {
    Idle,
    Active { start_ms: u64 },
}

#[derive(Debug, Clone, Copy)]
pub struct PulseState {
    phase: PulsePhase,
    last_trigger_ms: Option<u64>,
}

impl Default for PulseState {
    fn default() -> Self {
        Self {
            phase: PulsePhase::Idle,
            last_trigger_ms: None,
        }
    }
}

impl PulseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> PulsePhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, PulsePhase::Active { .. })
    }

    /// Start a pulse if idle and the interval has elapsed since the last one.
    /// A plant that has never pulsed pulses right away.
    pub fn maybe_trigger(&mut self, now_ms: u64, config: &PulseConfig) -> bool {
        if self.is_active() {
            return false;
        }
        let due = match self.last_trigger_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= config.interval_ms,
        };
        if due {
            self.start(now_ms);
        }
        due
    }

    /// Start a pulse now, restarting one already in flight
    pub fn force(&mut self, now_ms: u64) {
        self.start(now_ms);
    }

    fn start(&mut self, now_ms: u64) {
        log::debug!("growth pulse at {} ms", now_ms);
        self.phase = PulsePhase::Active { start_ms: now_ms };
        self.last_trigger_ms = Some(now_ms);
    }

    /// Current scale factor. Returns to idle, at exactly 1.0, once the
    /// duration has elapsed.
    pub fn scale(&mut self, now_ms: u64, config: &PulseConfig) -> f64 {
        let PulsePhase::Active { start_ms } = self.phase else {
            return 1.0;
        };
        let ratio = now_ms.saturating_sub(start_ms) as f64 / config.duration_ms.max(1) as f64;
        if ratio >= 1.0 {
            self.phase = PulsePhase::Idle;
            return 1.0;
        }
        pulse_curve(ratio, config)
    }
}

pub fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Swell to `scale_max` over the first half, dip to `scale_min` over the
/// third quarter, recover to 1 over the last quarter
pub fn pulse_curve(ratio: f64, config: &PulseConfig) -> f64 {
    let ratio = ratio.clamp(0.0, 1.0);
    if ratio < 0.5 {
        return 1.0 + (config.scale_max - 1.0) * ease_in_out_quad(ratio) * 2.0;
    }
    let second = (ratio - 0.5) * 2.0;
    if second < 0.5 {
        config.scale_max - (config.scale_max - config.scale_min) * second * 2.0
    } else {
        let recovery = (second - 0.5) * 2.0;
        config.scale_min + (1.0 - config.scale_min) * recovery
    }
}
