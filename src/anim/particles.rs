//! Drifting life particles
//!
//! Particles are decoration only, so they draw from a `rand` generator
//! owned by the pool instead of the morphology stream.

use crate::config::ParticleConfig;
use crate::palette::ColorTier;
use crate::raster::Surface;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MIN_OPACITY: f64 = 0.01;
const DRIFT_SCALE: f64 = 0.1;
const SPAWN_HEIGHT_SHARE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub life: f64,
    pub max_life: f64,
    pub opacity: f64,
}

impl Particle {
    fn spawn<R: Rng>(rng: &mut R, center_x: f64, top_y: f64, bottom_y: f64, config: &ParticleConfig) -> Self {
        let x = center_x + (rng.gen::<f64>() - 0.5) * config.spread;
        let y = bottom_y - rng.gen::<f64>() * (bottom_y - top_y) * SPAWN_HEIGHT_SHARE;
        let life = config.life_min + rng.gen::<f64>() * (config.life_max - config.life_min);
        Self {
            x,
            y,
            vx: (rng.gen::<f64>() - 0.5) * 0.2,
            vy: -config.rise_speed * (0.8 + rng.gen::<f64>() * 0.4),
            life,
            max_life: life,
            opacity: config.base_opacity,
        }
    }

    pub fn update(&mut self, frame: u64, config: &ParticleConfig) {
        self.x += self.vx;
        self.y += self.vy;
        self.x += (frame as f64 * config.drift_frequency + self.x).sin() * config.drift_amplitude * DRIFT_SCALE;
        self.life -= 1.0;
        let ratio = if self.max_life > 0.0 { self.life / self.max_life } else { 0.0 };
        self.opacity = config.base_opacity * ratio;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0 && self.opacity > MIN_OPACITY
    }
}

/// Bounded particle pool, owned by the renderer
pub struct ParticlePool {
    particles: Vec<Particle>,
    frame: u64,
    rng: StdRng,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Reproducible pool, for tests and still renders
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            frame: 0,
            rng,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Add a particle directly, still honoring the cap
    pub fn push(&mut self, particle: Particle, config: &ParticleConfig) -> bool {
        if self.particles.len() >= config.max_count {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// One frame: maybe spawn, advance everything, cull the dead
    pub fn step(&mut self, spawn: bool, center_x: f64, top_y: f64, bottom_y: f64, config: &ParticleConfig) {
        if spawn && self.particles.len() < config.max_count && self.rng.gen::<f64>() < config.spawn_probability {
            let p = Particle::spawn(&mut self.rng, center_x, top_y, bottom_y, config);
            self.particles.push(p);
        }

        self.frame += 1;
        let frame = self.frame;
        for p in &mut self.particles {
            p.update(frame, config);
        }
        self.particles.retain(Particle::is_alive);
    }

    /// Single pixels at each particle's opacity, shimmering between tones
    pub fn draw(&mut self, surface: &mut Surface, tier: &ColorTier) {
        for p in &self.particles {
            let pick = self.rng.gen::<f64>();
            let color = if pick < 0.3 {
                tier.light
            } else if pick < 0.7 {
                tier.main
            } else {
                tier.dark
            };
            surface.plot_pixel_alpha(p.x.round(), p.y.round(), color, p.opacity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_spawn() -> ParticleConfig {
        ParticleConfig {
            spawn_probability: 1.0,
            ..ParticleConfig::default()
        }
    }

    #[test]
    fn pool_is_capped() {
        let config = always_spawn();
        let mut pool = ParticlePool::seeded(1);
        for _ in 0..50 {
            pool.step(true, 64.0, 80.0, 159.0, &config);
        }
        assert_eq!(pool.len(), config.max_count);
    }

    #[test]
    fn no_spawn_when_disabled() {
        let mut pool = ParticlePool::seeded(1);
        for _ in 0..100 {
            pool.step(false, 64.0, 80.0, 159.0, &always_spawn());
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn opacity_strictly_decreases_and_particle_rises() {
        let config = ParticleConfig::default();
        let mut p = Particle {
            x: 60.0,
            y: 150.0,
            vx: 0.0,
            vy: -0.3,
            life: 80.0,
            max_life: 80.0,
            opacity: config.base_opacity,
        };
        let mut prev = p;
        for frame in 1..40 {
            p.update(frame, &config);
            assert!(p.opacity < prev.opacity);
            assert!(p.y < prev.y);
            prev = p;
        }
    }

    #[test]
    fn dead_particles_leave_within_one_frame() {
        let config = ParticleConfig::default();
        let mut pool = ParticlePool::seeded(3);
        let dying = Particle {
            x: 60.0,
            y: 100.0,
            vx: 0.0,
            vy: -0.3,
            life: 1.0,
            max_life: 100.0,
            opacity: 0.006,
        };
        assert!(pool.push(dying, &config));
        pool.step(false, 64.0, 80.0, 159.0, &config);
        assert!(pool.is_empty());
    }

    #[test]
    fn corrupt_particles_are_culled() {
        let config = ParticleConfig::default();
        let mut pool = ParticlePool::seeded(3);
        pool.push(
            Particle {
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
                life: -5.0,
                max_life: 0.0,
                opacity: 0.5,
            },
            &config,
        );
        pool.step(false, 64.0, 80.0, 159.0, &config);
        assert!(pool.is_empty());
    }

    #[test]
    fn spawned_particles_start_in_plant_area() {
        let config = always_spawn();
        let mut pool = ParticlePool::seeded(9);
        pool.step(true, 64.0, 80.0, 159.0, &config);
        let p = pool.particles()[0];
        assert!((43.0..=85.0).contains(&p.x));
        assert!(p.y <= 159.0 && p.y >= 80.0);
        assert!(p.vy < 0.0);
        assert!(p.opacity < config.base_opacity);
    }

    #[test]
    fn draw_blends_at_particle_opacity() {
        let config = ParticleConfig::default();
        let mut pool = ParticlePool::seeded(4);
        pool.push(
            Particle {
                x: 10.2,
                y: 20.7,
                vx: 0.0,
                vy: 0.0,
                life: 10.0,
                max_life: 10.0,
                opacity: 0.6,
            },
            &config,
        );
        let mut surface = Surface::default();
        pool.draw(&mut surface, &crate::palette::Palette::default().particle);
        assert_eq!(surface.get(10, 21).map(|p| p.0[3]), Some(153));
    }
}
