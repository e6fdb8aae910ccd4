//! End-to-end behavior of the growth engine through its public API

use pixelbonsai::anim::pulse::pulse_curve;
use pixelbonsai::anim::wind::wind_offset;
use pixelbonsai::config::{PlantConfig, PulseConfig, WindConfig};
use pixelbonsai::pot::POT_TOP_Y;
use pixelbonsai::renderer::{render_still, PlantRenderer, RenderMode};
use pixelbonsai::stage::Stage;
use pixelbonsai::timer::{FocusTimer, TimerSnapshot, TimerStatus};
use std::time::Duration;

fn snapshot(growth: u32, progress: f64, status: TimerStatus) -> TimerSnapshot {
    TimerSnapshot {
        total_growth: growth,
        session_progress: progress,
        is_work_session: true,
        status,
        current_session: 1,
    }
}

fn still_renderer() -> PlantRenderer {
    let mut r = PlantRenderer::new(PlantConfig::default()).unwrap().with_particle_seed(7);
    r.set_reduced_motion(true);
    r
}

fn opaque_above_pot(image: &image::RgbaImage) -> usize {
    (0..POT_TOP_Y as u32)
        .flat_map(|y| (0..image.width()).map(move |x| (x, y)))
        .filter(|&(x, y)| image.get_pixel(x, y).0[3] > 0)
        .count()
}

#[test]
fn same_state_renders_identical_pixels() {
    for growth in [0, 1, 2, 5, 9, 20] {
        let s = snapshot(growth, 0.45, TimerStatus::Idle);
        let (a, _) = render_still(PlantConfig::default(), &s, false).unwrap();
        let (b, _) = render_still(PlantConfig::default(), &s, false).unwrap();
        assert!(a == b, "growth {} rendered differently", growth);
    }
}

#[test]
fn fresh_plant_is_a_small_seedling() {
    let mut r = still_renderer();
    let info = r.sync(&TimerSnapshot::default(), 0);
    assert_eq!(info.stage, Stage::Seedling);
    assert_eq!(info.branches, 0);
    assert!(info.trunk_rows > 0);
    assert!(opaque_above_pot(r.image()) > 0);
}

#[test]
fn stage_boundaries_follow_growth() {
    let mut r = still_renderer();
    let expected = [
        (0, Stage::Seedling),
        (1, Stage::Growth),
        (2, Stage::Growth),
        (3, Stage::Mature),
        (7, Stage::Mature),
        (8, Stage::Ancient),
        (100, Stage::Ancient),
    ];
    for (growth, stage) in expected {
        let info = r.sync(&snapshot(growth, 0.0, TimerStatus::Idle), 0);
        assert_eq!(info.stage, stage, "growth {}", growth);
    }
}

#[test]
fn older_plants_are_bigger() {
    let young = render_still(PlantConfig::default(), &snapshot(0, 0.0, TimerStatus::Idle), false).unwrap().0;
    let old = render_still(PlantConfig::default(), &snapshot(12, 0.0, TimerStatus::Idle), false).unwrap().0;
    assert!(opaque_above_pot(&old) > opaque_above_pot(&young));
}

#[test]
fn each_threshold_triggers_one_branch() {
    let mut r = still_renderer();
    let mut counts = Vec::new();
    for step in 1..=100 {
        let progress = step as f64 / 100.0;
        let info = r.sync(&snapshot(2, progress, TimerStatus::Idle), step * 16);
        counts.push(info.branches);
    }
    // 0.3, 0.6, 0.85
    assert_eq!(counts[28], 0);
    assert_eq!(counts[29], 1);
    assert_eq!(counts[59], 2);
    assert_eq!(counts[84], 3);
    assert_eq!(*counts.last().unwrap(), 3);
    assert!(counts.windows(2).all(|w| w[0] <= w[1]));

    // Re-syncing the same progress adds nothing
    let again = r.sync(&snapshot(2, 1.0, TimerStatus::Idle), 5000);
    assert_eq!(again.branches, 3);
}

#[test]
fn session_reset_clears_branches_but_keeps_the_tree() {
    let mut fresh = still_renderer();
    fresh.sync(&snapshot(4, 0.0, TimerStatus::Idle), 0);
    let baseline = fresh.image().clone();

    let mut r = still_renderer();
    r.sync(&snapshot(4, 0.9, TimerStatus::Idle), 0);
    assert_eq!(r.branch_set().len(), 3);
    let epoch = r.branch_set().epoch();

    let info = r.sync(&snapshot(4, 0.0, TimerStatus::Idle), 16);
    assert_eq!(info.branches, 0);
    assert!(r.branch_set().is_empty());
    assert_eq!(r.branch_set().epoch(), epoch + 1);
    assert!(r.image() == &baseline);
}

#[test]
fn next_session_grows_new_branches_on_the_same_tree() {
    let mut r = still_renderer();
    let first = r.sync(&snapshot(4, 0.9, TimerStatus::Idle), 0);
    let first_branches = r.branch_set().branches().to_vec();
    let first_image = r.image().clone();

    r.sync(&snapshot(4, 0.0, TimerStatus::Idle), 16);
    let second = r.sync(&snapshot(4, 0.9, TimerStatus::Idle), 32);
    let second_branches = r.branch_set().branches().to_vec();

    assert_eq!(first.branches, 3);
    assert_eq!(second.branches, 3);
    assert_eq!(second.trunk_rows, first.trunk_rows);
    assert_ne!(first_branches, second_branches);
    assert!(r.image() != &first_image);

    // Pot and soil rows are untouched by the new branches
    let (w, h) = first_image.dimensions();
    for y in POT_TOP_Y as u32 + 1..h {
        for x in 0..w {
            assert_eq!(r.image().get_pixel(x, y), first_image.get_pixel(x, y), "pot pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn widest_accepted_trunk_margin_renders_every_stage() {
    let mut config = PlantConfig::default();
    // Ancient bands top out at 4px plus 1px of flare
    config.trunk.side_margin = 61;
    config.validate().unwrap();
    for growth in [0, 1, 3, 8, 30] {
        render_still(config.clone(), &snapshot(growth, 0.5, TimerStatus::Idle), false).unwrap();
    }

    config.trunk.side_margin = 62;
    assert!(PlantRenderer::new(config).is_err());
}

#[test]
fn breaks_show_no_session_progress() {
    let mut r = still_renderer();
    let mut s = snapshot(4, 0.9, TimerStatus::Running);
    s.is_work_session = false;
    let info = r.sync(&s, 0);
    assert_eq!(info.branches, 0);
    assert_eq!(r.state().session_progress, 0.0);
}

#[test]
fn wind_is_silent_unless_running_with_motion() {
    let config = WindConfig::default();
    assert_eq!(wind_offset(0.0, 1234.0, false, &config), 0);

    let mut r = PlantRenderer::new(PlantConfig::default()).unwrap().with_particle_seed(1);
    r.set_reduced_motion(true);
    r.sync(&snapshot(5, 0.5, TimerStatus::Running), 0);
    let first = r.image().clone();
    for t in 1..30 {
        r.render_frame(t * 16);
        assert!(r.image() == &first, "reduced motion frame {} moved", t);
    }
}

#[test]
fn paused_frames_are_static() {
    let mut r = PlantRenderer::new(PlantConfig::default()).unwrap().with_particle_seed(1);
    r.sync(&snapshot(5, 0.5, TimerStatus::Paused), 0);
    assert_eq!(r.mode(), RenderMode::Static);
    assert!(!r.on_frame(16));
}

#[test]
fn pulse_stays_within_bounds() {
    let config = PulseConfig::default();
    for i in 0..=200 {
        let scale = pulse_curve(i as f64 / 200.0, &config);
        assert!(scale >= config.scale_min - 1e-9 && scale <= config.scale_max + 1e-9);
    }
    assert!((pulse_curve(1.0, &config) - 1.0).abs() < 1e-9);
}

#[test]
fn running_renderer_pulses_then_settles() {
    let mut r = PlantRenderer::new(PlantConfig::default()).unwrap().with_particle_seed(1);
    let info = r.sync(&snapshot(2, 0.1, TimerStatus::Running), 0);
    // First trigger is immediate
    assert!(r.pulse().is_active());
    assert_eq!(info.pulse_scale, 1.0);
    r.render_frame(300);
    assert!(r.last_frame().unwrap().pulse_scale > 1.0);
    r.render_frame(700);
    assert_eq!(r.last_frame().unwrap().pulse_scale, 1.0);
    assert!(!r.pulse().is_active());
}

#[test]
fn particles_never_exceed_the_cap() {
    let mut config = PlantConfig::default();
    config.particles.spawn_probability = 1.0;
    let cap = config.particles.max_count;
    let mut r = PlantRenderer::new(config).unwrap().with_particle_seed(3);
    r.sync(&snapshot(6, 0.5, TimerStatus::Running), 0);
    for t in 1..200 {
        r.on_frame(t * 16);
        assert!(r.particles().len() <= cap);
    }
    assert!(!r.particles().is_empty());

    r.set_reduced_motion(true);
    r.sync(&snapshot(6, 0.5, TimerStatus::Running), 4000);
    assert!(r.particles().is_empty());
}

#[test]
fn timer_completion_grows_the_rendered_plant() {
    let mut timer = FocusTimer::new(Default::default(), 2);
    let mut r = still_renderer();
    r.sync(&timer.snapshot(), 0);
    assert_eq!(r.last_frame().unwrap().stage, Stage::Growth);

    timer.start();
    timer.tick(Duration::from_secs(25 * 60));
    r.sync(&timer.snapshot(), 16);
    assert_eq!(r.state().total_growth, 3);
    assert_eq!(r.last_frame().unwrap().stage, Stage::Mature);
}
