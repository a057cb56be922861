/// Deterministic xorshift32 generator.
///
/// Every random decision in the simulation (AI timers, wander directions,
/// boss rolls, enemy drops) draws from one instance, so a seed plus an input
/// sequence reproduces a run exactly.

/// Substituted for a zero seed, which would lock the generator at zero.
const ZERO_SEED_FALLBACK: u32 = 12345;

#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Rng {
            state: if seed == 0 { ZERO_SEED_FALLBACK } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// `next_u32() % n`; the modulo bias is part of the reproducible behaviour.
    pub fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.next_u32() % n
    }

    /// `base + (next % steps) / 100`: a timer in centisecond steps.
    pub fn timer(&mut self, base: f64, steps: u32) -> f64 {
        base + self.below(steps) as f64 / 100.0
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}
