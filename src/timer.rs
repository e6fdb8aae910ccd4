//! Focus timer: work sessions alternating with short and long breaks.
//! Each finished work session grows the plant by one.

use crate::config::TimerConfig;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerPhase {
    pub fn label(&self) -> &'static str {
        match self {
            TimerPhase::Work => "Focus",
            TimerPhase::ShortBreak => "Short break",
            TimerPhase::LongBreak => "Long break",
        }
    }

    pub fn is_work(&self) -> bool {
        matches!(self, TimerPhase::Work)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
}

/// What the renderer sees of the timer on each update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerSnapshot {
    pub total_growth: u32,
    /// Fraction of the current phase elapsed, in [0, 1]
    pub session_progress: f64,
    pub is_work_session: bool,
    pub status: TimerStatus,
    pub current_session: u32,
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self {
            total_growth: 0,
            session_progress: 0.0,
            is_work_session: true,
            status: TimerStatus::Idle,
            current_session: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    WorkComplete { total_growth: u32 },
    BreakComplete { next_session: u32 },
}

pub struct FocusTimer {
    config: TimerConfig,
    phase: TimerPhase,
    status: TimerStatus,
    remaining: Duration,
    total: Duration,
    total_growth: u32,
    current_session: u32,
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(m as u64 * 60)
}

impl FocusTimer {
    pub fn new(config: TimerConfig, total_growth: u32) -> Self {
        let total = minutes(config.work_mins);
        Self {
            config,
            phase: TimerPhase::Work,
            status: TimerStatus::Idle,
            remaining: total,
            total,
            total_growth,
            current_session: 1,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn total_growth(&self) -> u32 {
        self.total_growth
    }

    pub fn current_session(&self) -> u32 {
        self.current_session
    }

    pub fn progress(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }
        (1.0 - self.remaining.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            total_growth: self.total_growth,
            session_progress: self.progress(),
            is_work_session: self.phase.is_work(),
            status: self.status,
            current_session: self.current_session,
        }
    }

    pub fn start(&mut self) {
        self.status = TimerStatus::Running;
    }

    pub fn pause(&mut self) {
        if self.status == TimerStatus::Running {
            self.status = TimerStatus::Paused;
        }
    }

    pub fn toggle(&mut self) {
        match self.status {
            TimerStatus::Running => self.pause(),
            TimerStatus::Idle | TimerStatus::Paused => self.start(),
        }
    }

    /// Advance by `elapsed` of wall time. Only counts down while running.
    pub fn tick(&mut self, elapsed: Duration) -> Option<TimerEvent> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(elapsed);
        if self.remaining.is_zero() {
            Some(self.finish_phase(true))
        } else {
            None
        }
    }

    /// End the current phase early. Skipping work does not grow the plant.
    pub fn skip(&mut self) -> TimerEvent {
        self.finish_phase(false)
    }

    /// Restart the current phase from full, keeping the session number
    pub fn reset(&mut self) {
        self.status = TimerStatus::Idle;
        self.remaining = self.total;
    }

    fn finish_phase(&mut self, grow: bool) -> TimerEvent {
        let event = match self.phase {
            TimerPhase::Work => {
                if grow {
                    self.total_growth += 1;
                }
                let long = self.current_session % self.config.sessions_until_long.max(1) == 0;
                self.phase = if long { TimerPhase::LongBreak } else { TimerPhase::ShortBreak };
                TimerEvent::WorkComplete {
                    total_growth: self.total_growth,
                }
            }
            TimerPhase::ShortBreak | TimerPhase::LongBreak => {
                self.phase = TimerPhase::Work;
                self.current_session += 1;
                TimerEvent::BreakComplete {
                    next_session: self.current_session,
                }
            }
        };

        self.total = minutes(match self.phase {
            TimerPhase::Work => self.config.work_mins,
            TimerPhase::ShortBreak => self.config.short_break_mins,
            TimerPhase::LongBreak => self.config.long_break_mins,
        });
        self.remaining = self.total;
        self.status = TimerStatus::Idle;
        log::info!("{:?}, now {}", event, self.phase.label());
        event
    }
}
