//! Deterministic Random Number Generator
//!
//! Xorshift128+ seeded through SplitMix64. Used for every random placement the
//! authority makes (dropped mask tokens, spawned items) so a match replays
//! identically from its seed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::bounds::{Bounds, Position};

/// Deterministic PRNG using Xorshift128+.
///
/// ```
/// use masquerade::core::rng::DeterministicRng;
/// use masquerade::core::bounds::Bounds;
///
/// let mut a = DeterministicRng::new(7);
/// let mut b = DeterministicRng::new(7);
/// let arena = Bounds::square(20.0);
/// assert_eq!(a.position_in(&arena), b.position_in(&arena));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // All-zero state is a fixed point of xorshift
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create an RNG for a match from its id and a salt (e.g. the reset count).
    pub fn for_match(match_id: &[u8; 16], salt: u64) -> Self {
        Self::new(derive_match_seed(match_id, salt))
    }

    /// Next 64-bit value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Next 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Integer in `[0, max)`; `0` when `max == 0`.
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as u32
    }

    /// Float in `[0, 1)` with 24 bits of precision.
    #[inline]
    pub fn next_unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Float in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn next_f32_range(&mut self, min: f32, max: f32) -> f32 {
        if !(max > min) {
            return min;
        }
        let v = min + (max - min) * self.next_unit();
        // Rounding can land exactly on `max`
        if v >= max {
            min
        } else {
            v
        }
    }

    /// Uniform point inside `bounds`.
    pub fn position_in(&mut self, bounds: &Bounds) -> Position {
        let x = self.next_f32_range(bounds.min.x, bounds.max.x);
        let y = self.next_f32_range(bounds.min.y, bounds.max.y);
        Position::new(x, y)
    }

    /// Pick an element of a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            slice.get(idx)
        }
    }

    /// Internal state, for checkpoints.
    pub fn state(&self) -> [u64; 2] {
        self.state
    }

    /// Restore a checkpoint.
    pub fn set_state(&mut self, state: [u64; 2]) {
        self.state = state;
    }
}

/// SplitMix64 step.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a match seed from the match id and a salt.
pub fn derive_match_seed(match_id: &[u8; 16], salt: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(b"MASQUERADE_SEED_V1");
    hasher.update(match_id);
    hasher.update(salt.to_le_bytes());
    let hash = hasher.finalize();

    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================
