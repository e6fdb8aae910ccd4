//! Animation engine
//!
//! Wind sway, the growth pulse and the particle pool. These only move,
//! scale or fade the organic layer; none of them touch morphology.

pub mod particles;
pub mod pulse;
pub mod wind;

pub use particles::{Particle, ParticlePool};
pub use pulse::{PulsePhase, PulseState};
pub use wind::WindClock;
