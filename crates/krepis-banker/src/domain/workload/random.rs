//! Seedable Random Source
//!
//! The workload draws every random decision through [`RandomSource`],
//! so a simulation is fully reproducible from its seed.

/// Source of uniformly distributed 64-bit values
pub trait RandomSource {
    /// Next raw value
    fn next_u64(&mut self) -> u64;

    /// Uniform value in `[0, bound)`; `0` when `bound == 0`
    fn below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        // Reject the biased tail so every residue is equally likely
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let v = self.next_u64();
            if v < zone {
                return v % bound;
            }
        }
    }

    /// Uniform value in `[lo, hi]`
    fn range_inclusive(&mut self, lo: u64, hi: u64) -> u64 {
        debug_assert!(lo <= hi);
        match (hi - lo).checked_add(1) {
            Some(span) => lo + self.below(span),
            None => self.next_u64(),
        }
    }

    /// `true` with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        // 53 high bits -> uniform f64 in [0, 1)
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        unit < p
    }
}

/// xorshift64* generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xorshift64Star {
    state: u64,
}

impl Xorshift64Star {
    /// Replacement for the all-zero seed, which xorshift cannot leave
    const ZERO_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    /// Create a generator from `seed`
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::ZERO_SEED } else { seed },
        }
    }

    /// Current internal state (resuming from it reproduces the stream)
    pub fn state(&self) -> u64 {
        self.state
    }
}

impl RandomSource for Xorshift64Star {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}
