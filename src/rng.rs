//! The pluggable PRNG contract used by [`crate::sample`] and [`crate::model::Model`].
//!
//! The model never reaches for floats or a global RNG: every draw goes through
//! [`Rng::next_bounded`], so a caller can swap in a deterministic test double
//! or a cryptographically strong generator without touching the sampling code.

use alloc::boxed::Box;

/// A bounded-integer sampler parameterized by opaque internal state.
///
/// `next_bounded(max)` must return a value in `[0, max)` and must be
/// deterministic given the implementor's state — two calls against the same
/// state (e.g. a cloned RNG) must return the same value. `max` is always
/// `>= 1`; implementors may assume the caller upholds this.
///
/// Bounded by `Send` so a [`crate::model::Model`] (which stores a `Box<dyn
/// Rng + Send>`) stays `Send` regardless of which generator backs it.
pub trait Rng: Send {
    /// Draw a uniformly distributed integer in `[0, max)`.
    ///
    /// # Panics
    ///
    /// Implementors may panic if `max == 0`; callers must never pass 0.
    fn next_bounded(&mut self, max: u32) -> u32;
}

impl Rng for Box<dyn Rng + Send> {
    fn next_bounded(&mut self, max: u32) -> u32 {
        (**self).next_bounded(max)
    }
}

/// A 32-bit-output PCG (permuted congruential generator), XSH-RR variant.
///
/// This is the crate's default [`Rng`] implementation. It is seeded from a
/// single `u32` rather than PCG's usual 64-bit seed/sequence pair, trading a
/// little of the family's statistical strength for a seed type that matches
/// the original model's 32-bit seed contract.
#[derive(Debug, Clone)]
pub struct PcgRng {
    state: u64,
    inc: u64,
}

const PCG_MULTIPLIER: u64 = 6364136223846793005;

impl PcgRng {
    /// Create a generator seeded from a 32-bit value.
    ///
    /// Two `PcgRng`s created from the same seed produce identical streams.
    pub fn new(seed: u32) -> Self {
        let mut rng = PcgRng {
            state: 0,
            inc: ((seed as u64) << 1) | 1,
        };
        rng.step();
        rng.state = rng.state.wrapping_add(seed as u64);
        rng.step();
        rng
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(PCG_MULTIPLIER)
            .wrapping_add(self.inc);
    }

    /// Draw a raw, unbounded 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl Rng for PcgRng {
    fn next_bounded(&mut self, max: u32) -> u32 {
        debug_assert!(max >= 1, "next_bounded requires max >= 1");
        if max == 1 {
            return 0;
        }
        // Lemire-style rejection sampling to avoid modulo bias.
        let threshold = max.wrapping_neg() % max;
        loop {
            let r = self.next_u32();
            if r >= threshold {
                return r % max;
            }
        }
    }
}

/// Adapts any [`rand::RngCore`] implementor to the crate's [`Rng`] contract,
/// so the `rand`/`rand_chacha` ecosystem can back sampling instead of the
/// built-in [`PcgRng`].
#[cfg(feature = "rand-backend")]
pub struct RandAdapter<R>(pub R);

#[cfg(feature = "rand-backend")]
impl<R: rand::RngCore + Send> Rng for RandAdapter<R> {
    fn next_bounded(&mut self, max: u32) -> u32 {
        use rand::Rng as _;
        self.0.gen_range(0..max)
    }
}
