//! Frame orchestration
//!
//! `PlantRenderer` owns every piece of cross-frame state: the pot cache,
//! color caches, triggered branches, wind clock, pulse and particle pool.
//! Each frame is rebuilt from the current [`GrowthState`]; nothing about
//! the plant's shape is stored between frames except the branch triggers.
//!
//! The host calls [`PlantRenderer::sync`] whenever the timer changes and
//! [`PlantRenderer::on_frame`] at its display cadence. While animating the
//! renderer keeps one frame request pending; going static cancels it, so no
//! frame is drawn after the timer stops.

use crate::accessory::{draw_sign_board, draw_snow};
use crate::anim::{ParticlePool, PulseState, WindClock};
use crate::branch::{build_branches, draw_branches, TriggeredBranchSet};
use crate::config::PlantConfig;
use crate::error::Result;
use crate::foliage::{draw_foliage, generate_foliage, FoliageInput, FoliageMark};
use crate::palette::{LeafColorCache, TrunkColorCache};
use crate::pot::{PotCache, POT_CENTER_X, POT_TOP_Y};
use crate::raster::{ScaleTransform, Surface};
use crate::rng::SeededRandom;
use crate::stage::{Stage, StageTable};
use crate::timer::{TimerSnapshot, TimerStatus};
use crate::trunk::{draw_trunk, generate_trunk, TrunkParams};
use image::RgbaImage;

const SNOW_SEED_OFFSET: u64 = 777;
const FALLBACK_PLANT_HEIGHT: i32 = 20;

/// The engine's whole view of the timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthState {
    pub total_growth: u32,
    /// 0 outside work sessions
    pub session_progress: f64,
    pub is_running: bool,
}

impl From<&TimerSnapshot> for GrowthState {
    fn from(s: &TimerSnapshot) -> Self {
        Self {
            total_growth: s.total_growth,
            session_progress: if s.is_work_session {
                s.session_progress.clamp(0.0, 1.0)
            } else {
                0.0
            },
            is_running: s.status == TimerStatus::Running,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Static,
    Animating,
}

/// A single pending frame request, like a display's animation-frame queue
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Option<u64>,
    next_id: u64,
}

impl FrameScheduler {
    /// Request a frame; returns the existing id if one is already pending
    pub fn request(&mut self) -> u64 {
        if let Some(id) = self.pending {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.pending = Some(id);
        id
    }

    pub fn cancel(&mut self) -> Option<u64> {
        self.pending.take()
    }

    /// Consume the pending request, if any
    pub fn take(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// What the last frame drew
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub stage: Stage,
    pub stage_progress: f64,
    pub trunk_rows: usize,
    pub branches: usize,
    pub foliage: usize,
    pub pulse_scale: f64,
}

pub struct PlantRenderer {
    config: PlantConfig,
    stages: StageTable,
    surface: Surface,
    pot: PotCache,
    trunk_colors: TrunkColorCache,
    leaf_colors: LeafColorCache,
    branches: TriggeredBranchSet,
    wind: WindClock,
    pulse: PulseState,
    particles: ParticlePool,
    scheduler: FrameScheduler,
    mode: RenderMode,
    state: GrowthState,
    session: u32,
    reduced_motion: bool,
    snow: bool,
    prev_stage: Option<Stage>,
    last_frame: Option<FrameInfo>,
}

impl PlantRenderer {
    pub fn new(config: PlantConfig) -> Result<Self> {
        config.validate()?;
        let stages = StageTable::from_config(&config.stages)?;
        let snow = config.accessories.snow;
        Ok(Self {
            config,
            stages,
            surface: Surface::default(),
            pot: PotCache::new(),
            trunk_colors: TrunkColorCache::new(),
            leaf_colors: LeafColorCache::new(),
            branches: TriggeredBranchSet::new(),
            wind: WindClock::new(),
            pulse: PulseState::new(),
            particles: ParticlePool::new(),
            scheduler: FrameScheduler::default(),
            mode: RenderMode::Static,
            state: GrowthState {
                total_growth: 0,
                session_progress: 0.0,
                is_running: false,
            },
            session: 1,
            reduced_motion: false,
            snow,
            prev_stage: None,
            last_frame: None,
        })
    }

    /// Fix the particle stream so frames are reproducible
    pub fn with_particle_seed(mut self, seed: u64) -> Self {
        self.particles = ParticlePool::seeded(seed);
        self
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.reduced_motion = reduced;
    }

    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    pub fn set_snow(&mut self, snow: bool) {
        self.snow = snow;
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn state(&self) -> GrowthState {
        self.state
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn image(&self) -> &RgbaImage {
        self.surface.image()
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    pub fn pulse(&self) -> &PulseState {
        &self.pulse
    }

    pub fn branch_set(&self) -> &TriggeredBranchSet {
        &self.branches
    }

    pub fn pot_builds(&self) -> u64 {
        self.pot.builds()
    }

    pub fn last_frame(&self) -> Option<FrameInfo> {
        self.last_frame
    }

    /// Take a new timer snapshot. Always renders one frame for the new
    /// state, then either keeps a frame pending (animating) or cancels any
    /// pending frame (static).
    pub fn sync(&mut self, snapshot: &TimerSnapshot, now_ms: u64) -> FrameInfo {
        self.state = GrowthState::from(snapshot);
        self.session = snapshot.current_session;

        let mode = if self.state.is_running && !self.reduced_motion {
            RenderMode::Animating
        } else {
            RenderMode::Static
        };
        if mode != self.mode {
            log::debug!("render mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }

        let info = self.render_frame(now_ms);
        match self.mode {
            RenderMode::Animating => {
                self.scheduler.request();
            }
            RenderMode::Static => {
                self.scheduler.cancel();
            }
        }
        info
    }

    /// Run the pending frame, if there is one. Returns whether a frame was
    /// drawn.
    pub fn on_frame(&mut self, now_ms: u64) -> bool {
        if !self.scheduler.take() {
            return false;
        }
        self.render_frame(now_ms);
        if self.mode == RenderMode::Animating {
            self.scheduler.request();
        }
        true
    }

    /// Draw one complete frame for the current state
    pub fn render_frame(&mut self, now_ms: u64) -> FrameInfo {
        let GrowthState {
            total_growth,
            session_progress,
            is_running,
        } = self.state;
        let cfg = &self.config;
        let palette = &cfg.palette;
        let seed = cfg.base_seed.wrapping_add(total_growth as u64);
        let motion = !self.reduced_motion;

        self.surface.set_transform(None);
        self.surface.clear();
        let layer = self.pot.layer(seed, palette, cfg.accessories.moss);
        self.surface.blit_base(layer);

        if cfg.accessories.sign_board {
            draw_sign_board(&mut self.surface, self.session, &palette.sign);
        }

        let stage = self.stages.stage(total_growth);
        let stage_progress = self.stages.progress(total_growth, session_progress);
        if let Some(prev) = self.prev_stage {
            if prev != stage {
                log::debug!("stage change {} -> {}", prev, stage);
                if motion && cfg.pulse.on_stage_change {
                    self.pulse.force(now_ms);
                }
            }
        }
        self.prev_stage = Some(stage);

        if motion && is_running {
            self.pulse.maybe_trigger(now_ms, &cfg.pulse);
        }
        let pulse_scale = if motion { self.pulse.scale(now_ms, &cfg.pulse) } else { 1.0 };
        if pulse_scale != 1.0 {
            self.surface.set_transform(Some(ScaleTransform {
                cx: POT_CENTER_X as f64,
                cy: POT_TOP_Y as f64,
                scale: pulse_scale,
            }));
        }

        let dims = cfg.stages.dims(stage);
        let mut rng = SeededRandom::new(seed);
        let trunk = generate_trunk(
            stage,
            &mut rng,
            &TrunkParams {
                dims,
                trunk: &cfg.trunk,
                stage_progress,
                total_growth,
            },
        );
        draw_trunk(&mut self.surface, &trunk, &mut self.trunk_colors, palette, &cfg.trunk.gradient);

        self.branches.observe(session_progress, seed, &cfg.branches);
        let branches = build_branches(&trunk, &self.branches, dims, &cfg.branches);
        draw_branches(&mut self.surface, &branches, palette.trunk_young.main);

        let marks = generate_foliage(
            &mut rng,
            &FoliageInput {
                trunk: &trunk,
                branches: &branches,
                dims,
                config: &cfg.foliage,
                palette,
                stage_progress,
                session_progress,
            },
            &mut self.leaf_colors,
        );

        self.wind.tick(is_running, self.reduced_motion, &cfg.wind);
        let wind = self.wind;
        let sway = |m: &FoliageMark| wind.offset(m.height_ratio, m.on_branch, &cfg.wind);
        draw_foliage(&mut self.surface, &marks, palette, cfg.foliage.highlight_height, sway);

        if self.snow {
            draw_snow(
                &mut self.surface,
                &marks,
                seed.wrapping_add(SNOW_SEED_OFFSET),
                cfg.accessories.snow_density,
                palette.snow,
                sway,
            );
        }

        self.surface.set_transform(None);

        if motion {
            let top_y = trunk.last().map(|p| p.y).unwrap_or(POT_TOP_Y - FALLBACK_PLANT_HEIGHT);
            self.particles.step(
                is_running,
                POT_CENTER_X as f64,
                top_y as f64,
                POT_TOP_Y as f64,
                &cfg.particles,
            );
            self.particles.draw(&mut self.surface, &palette.particle);
        } else {
            self.particles.clear();
        }

        let info = FrameInfo {
            stage,
            stage_progress,
            trunk_rows: trunk.len(),
            branches: branches.len(),
            foliage: marks.len(),
            pulse_scale,
        };
        self.last_frame = Some(info);
        info
    }

    /// Plain-text account of the plant for screen readers and logs
    pub fn describe(&self) -> String {
        let growth = self.state.total_growth;
        let stage = self.stages.stage(growth);
        let progress = self.stages.progress(growth, self.state.session_progress);
        let sessions = if growth == 1 { "session" } else { "sessions" };
        let mut text = format!(
            "{} bonsai, {} focus {} grown, {:.0}% through this stage, session {}",
            stage,
            growth,
            sessions,
            progress * 100.0,
            self.session
        );
        if let Some(frame) = self.last_frame {
            if frame.branches > 0 {
                text.push_str(&format!(", {} new branches", frame.branches));
            }
        }
        text
    }
}

/// Render one still frame for `snapshot` without any motion
pub fn render_still(config: PlantConfig, snapshot: &TimerSnapshot, snow: bool) -> Result<(RgbaImage, String)> {
    let mut renderer = PlantRenderer::new(config)?.with_particle_seed(0);
    renderer.set_reduced_motion(true);
    renderer.set_snow(snow);
    let still = TimerSnapshot {
        status: TimerStatus::Idle,
        ..*snapshot
    };
    renderer.sync(&still, 0);
    let text = renderer.describe();
    Ok((renderer.surface.into_image(), text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(growth: u32, progress: f64, status: TimerStatus) -> TimerSnapshot {
        TimerSnapshot {
            total_growth: growth,
            session_progress: progress,
            is_work_session: true,
            status,
            current_session: 1,
        }
    }

    fn renderer() -> PlantRenderer {
        PlantRenderer::new(PlantConfig::default()).unwrap().with_particle_seed(1)
    }

    #[test]
    fn break_progress_is_zero() {
        let mut s = snapshot(2, 0.6, TimerStatus::Running);
        s.is_work_session = false;
        let state = GrowthState::from(&s);
        assert_eq!(state.session_progress, 0.0);
        assert!(state.is_running);
    }

    #[test]
    fn running_keeps_a_frame_pending() {
        let mut r = renderer();
        r.sync(&snapshot(0, 0.1, TimerStatus::Running), 0);
        assert_eq!(r.mode(), RenderMode::Animating);
        assert!(r.scheduler().is_pending());
        assert!(r.on_frame(16));
        assert!(r.scheduler().is_pending());
    }

    #[test]
    fn stopping_cancels_the_pending_frame() {
        let mut r = renderer();
        r.sync(&snapshot(0, 0.1, TimerStatus::Running), 0);
        r.sync(&snapshot(0, 0.1, TimerStatus::Paused), 16);
        assert_eq!(r.mode(), RenderMode::Static);
        assert!(!r.scheduler().is_pending());
        assert!(!r.on_frame(32));
    }

    #[test]
    fn reduced_motion_stays_static() {
        let mut r = renderer();
        r.set_reduced_motion(true);
        r.sync(&snapshot(0, 0.1, TimerStatus::Running), 0);
        assert_eq!(r.mode(), RenderMode::Static);
        assert!(!r.scheduler().is_pending());
        assert!(!r.pulse().is_active());
    }

    #[test]
    fn pot_is_rebuilt_only_on_growth_change() {
        let mut r = renderer();
        r.sync(&snapshot(1, 0.1, TimerStatus::Running), 0);
        for t in 1..20 {
            r.on_frame(t * 16);
        }
        assert_eq!(r.pot_builds(), 1);
        r.sync(&snapshot(2, 0.0, TimerStatus::Idle), 400);
        assert_eq!(r.pot_builds(), 2);
    }

    #[test]
    fn stage_change_forces_pulse() {
        let mut r = renderer();
        r.sync(&snapshot(0, 0.5, TimerStatus::Paused), 0);
        assert!(!r.pulse().is_active());
        r.sync(&snapshot(1, 0.0, TimerStatus::Paused), 100);
        assert!(r.pulse().is_active());
    }

    #[test]
    fn describe_names_stage_and_session() {
        let mut r = renderer();
        r.sync(&snapshot(3, 0.0, TimerStatus::Idle), 0);
        let text = r.describe();
        assert!(text.starts_with("Mature bonsai, 3 focus sessions grown"));
        assert!(text.contains("session 1"));
    }

    #[test]
    fn still_render_has_plant_pixels() {
        let (image, text) = render_still(PlantConfig::default(), &snapshot(5, 0.9, TimerStatus::Running), true).unwrap();
        assert_eq!(image.dimensions(), (128, 192));
        assert!(text.contains("Mature"));
        // Something is drawn above the pot rim
        let above = (0..POT_TOP_Y as u32).any(|y| (0..128).any(|x| image.get_pixel(x, y).0[3] > 0));
        assert!(above);
    }
}
