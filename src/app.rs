//! Interactive grow view: a focus timer with the bonsai drawn above it.
//!
//! The timer is the source of truth. Its snapshot is pushed into the
//! renderer whenever something visible changes (a new second, status,
//! phase, growth or session); between those, the renderer's own pending
//! frame request drives the animation.

use crate::config::Config;
use crate::display::{fit_placement, render_halfblock, scale_nearest};
use crate::error::Result;
use crate::help::{render_help_overlay, GROW_HELP};
use crate::raster::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::renderer::PlantRenderer;
use crate::terminal::Terminal;
use crate::timer::{FocusTimer, TimerEvent, TimerPhase, TimerStatus};
use crossterm::event::KeyCode;
use crossterm::style::Color;
use crossterm::terminal::size;
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

const FRAME: Duration = Duration::from_millis(16);
const STATUS_ROWS: u16 = 3;

/// Accepted timer speed multipliers
pub const SPEED_MIN: f64 = 0.1;
pub const SPEED_MAX: f64 = 10_000.0;

/// Parse a `--speed` value, rejecting anything outside the accepted range
pub fn parse_speed(text: &str) -> std::result::Result<f64, String> {
    let speed: f64 = text.trim().parse().map_err(|_| format!("'{}' is not a number", text))?;
    if !(SPEED_MIN..=SPEED_MAX).contains(&speed) {
        return Err(format!("speed must be between {} and {}", SPEED_MIN, SPEED_MAX));
    }
    Ok(speed)
}

/// Wall time scaled by the speed multiplier, saturating instead of overflowing
fn scaled(elapsed: Duration, speed: f64) -> Duration {
    Duration::try_from_secs_f64(elapsed.as_secs_f64() * speed).unwrap_or(Duration::MAX)
}

#[derive(Debug, Clone)]
pub struct GrowOptions {
    /// Focus sessions already completed
    pub growth: u32,
    /// Timer speed multiplier
    pub speed: f64,
    pub reduced_motion: bool,
    /// Overrides the configured snow accessory when set
    pub snow: Option<bool>,
}

impl Default for GrowOptions {
    fn default() -> Self {
        Self {
            growth: 0,
            speed: 1.0,
            reduced_motion: false,
            snow: None,
        }
    }
}

/// The parts of the timer whose change warrants a fresh sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SyncKey {
    second: u64,
    status: TimerStatus,
    phase: TimerPhase,
    growth: u32,
    session: u32,
}

impl SyncKey {
    fn of(timer: &FocusTimer) -> Self {
        Self {
            second: timer.remaining().as_secs(),
            status: timer.status(),
            phase: timer.phase(),
            growth: timer.total_growth(),
            session: timer.current_session(),
        }
    }
}

fn clock(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn status_word(status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Idle => "ready",
        TimerStatus::Running => "running",
        TimerStatus::Paused => "paused",
    }
}

fn draw_status(term: &mut Terminal, timer: &FocusTimer, renderer: &PlantRenderer) {
    let (w, h) = term.size();
    if h < STATUS_ROWS {
        return;
    }
    let color = match (timer.status(), timer.phase()) {
        (TimerStatus::Paused, _) => Color::DarkGrey,
        (_, TimerPhase::Work) => Color::Green,
        (_, _) => Color::Cyan,
    };

    let centered = |term: &mut Terminal, y: u16, text: &str, fg: Color, bold: bool| {
        let len = text.chars().count() as u16;
        let x = w.saturating_sub(len) / 2;
        term.set_str(x as i32, y as i32, text, Some(fg), bold);
    };

    let headline = format!(
        "{}  {}  {}",
        timer.phase().label(),
        clock(timer.remaining()),
        status_word(timer.status())
    );
    centered(term, h - 3, &headline, color, true);
    centered(term, h - 2, &renderer.describe(), Color::Grey, false);
    let motion = if renderer.reduced_motion() { "reduced motion" } else { "motion on" };
    centered(term, h - 1, &format!("{}  ? for keys", motion), Color::DarkGrey, false);
}

pub fn run(config: Config, options: GrowOptions) -> Result<()> {
    let mut term = Terminal::new(true)?;
    let mut timer = FocusTimer::new(config.timer.clone(), options.growth);
    let mut snow = options.snow.unwrap_or(config.plant.accessories.snow);
    let mut renderer = PlantRenderer::new(config.plant)?;
    renderer.set_reduced_motion(options.reduced_motion);
    renderer.set_snow(snow);

    let speed = if options.speed.is_nan() { 1.0 } else { options.speed.clamp(SPEED_MIN, SPEED_MAX) };
    let start = Instant::now();
    let mut last_tick = start;
    let mut show_help = false;
    let mut warned_empty = false;

    renderer.sync(&timer.snapshot(), 0);
    let mut last_key = SyncKey::of(&timer);
    let mut dirty = true;

    loop {
        let mut force_sync = false;
        if let Some((code, _mods)) = term.check_key()? {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('?') => show_help = !show_help,
                KeyCode::Char(' ') => timer.toggle(),
                KeyCode::Char('s') => {
                    timer.skip();
                }
                KeyCode::Char('r') => timer.reset(),
                KeyCode::Char('m') => {
                    renderer.set_reduced_motion(!renderer.reduced_motion());
                    force_sync = true;
                }
                KeyCode::Char('w') => {
                    snow = !snow;
                    renderer.set_snow(snow);
                    force_sync = true;
                }
                _ => {}
            }
            dirty = true;
        }

        if let Ok((new_w, new_h)) = size() {
            if (new_w, new_h) != term.size() {
                term.resize(new_w, new_h);
                term.clear_screen()?;
                warned_empty = false;
                dirty = true;
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick);
        last_tick = now;
        if let Some(TimerEvent::WorkComplete { .. }) = timer.tick(scaled(elapsed, speed)) {
            print!("\x07");
            let _ = stdout().flush();
        }

        let now_ms = now.duration_since(start).as_millis() as u64;
        let key = SyncKey::of(&timer);
        if force_sync || key != last_key {
            renderer.sync(&timer.snapshot(), now_ms);
            last_key = key;
            dirty = true;
        } else if renderer.on_frame(now_ms) {
            dirty = true;
        }

        if dirty {
            term.clear();
            let (w, h) = term.size();
            let placement = fit_placement(w, h.saturating_sub(STATUS_ROWS), CANVAS_WIDTH, CANVAS_HEIGHT);
            if placement.is_empty() {
                if !warned_empty {
                    log::error!("terminal too small to draw the plant ({}x{})", w, h);
                    warned_empty = true;
                }
            } else {
                let scaled = scale_nearest(renderer.image(), placement.art_w as u32, placement.pixel_height());
                render_halfblock(&mut term, &scaled, placement.x_offset, placement.y_offset);
            }
            draw_status(&mut term, &timer, &renderer);
            if show_help {
                render_help_overlay(&mut term, GROW_HELP);
            }
            if let Err(e) = term.present() {
                log::warn!("present failed: {}", e);
            }
            dirty = false;
        }

        term.sleep(FRAME);
    }

    Ok(())
}
