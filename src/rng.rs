//! Seeded linear congruential generator
//!
//! Every piece of plant morphology is drawn from this stream. The constants
//! are fixed so a seed reproduces the same plant on every platform, and the
//! order of calls inside each generator is part of its output.

const MULTIPLIER: u64 = 1_664_525;
const INCREMENT: u64 = 1_013_904_223;
const MODULUS: u64 = 1 << 32;

#[derive(Debug, Clone)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { state: seed % MODULUS }
    }

    /// Next value in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Uniform integer in [0, n) via floor(r * n)
    pub fn below(&mut self, n: u32) -> u32 {
        (self.next_f64() * n as f64).floor() as u32
    }

    /// Uniform real in [min, max)
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}
