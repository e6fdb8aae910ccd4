//! Pixel-art bonsai that grows with completed focus sessions.
//!
//! The engine is deterministic: the same growth state always produces the
//! same plant. Motion (wind, pulse, particles) is layered on top and can be
//! switched off entirely with reduced motion.

pub mod accessory;
pub mod anim;
pub mod app;
pub mod branch;
pub mod config;
pub mod display;
pub mod error;
pub mod foliage;
pub mod help;
pub mod palette;
pub mod pot;
pub mod raster;
pub mod renderer;
pub mod rng;
pub mod stage;
pub mod terminal;
pub mod timer;
pub mod trunk;

pub use config::{Config, PlantConfig};
pub use error::{PlantError, Result};
pub use renderer::{render_still, GrowthState, PlantRenderer, RenderMode};
pub use timer::{FocusTimer, TimerSnapshot, TimerStatus};
