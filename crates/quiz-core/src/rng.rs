//! Seeded pseudo-random numbers for shareable games.
//!
//! The generator is a plain linear congruential generator. Its multiplier,
//! increment and modulus are part of the share-link format: a seed must map to
//! the same round list in every build of the game, so they must never change.

use std::sync::atomic::{AtomicU64, Ordering};

/// LCG multiplier
pub const MULTIPLIER: u64 = 9301;
/// LCG increment
pub const INCREMENT: u64 = 49297;
/// LCG modulus
pub const MODULUS: u64 = 233_280;

/// Upper bound (exclusive) for freshly generated seeds
pub const SEED_RANGE: u64 = 1_000_000;

/// A game seed. Either taken from a share link or generated at game start.
pub type GameSeed = u64;

/// Deterministic PRNG driving round selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: u64,
}

impl SeededRandom {
    pub fn new(seed: GameSeed) -> Self {
        // (s * a + c) mod m == ((s mod m) * a + c) mod m, so reducing first keeps
        // the sequence exact for any u64 seed.
        Self {
            state: seed % MODULUS,
        }
    }

    /// Advance the state and return a float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * MULTIPLIER + INCREMENT) % MODULUS;
        self.state as f64 / MODULUS as f64
    }

    /// Integer in `[min, max]`, both inclusive.
    ///
    /// An empty range (`max < min`) returns `min`. The state still advances.
    pub fn next_int(&mut self, min: usize, max: usize) -> usize {
        let span = max.saturating_sub(min).saturating_add(1) as f64;
        (self.next_f64() * span).floor() as usize + min
    }
}

/// Fill `buf` from the OS entropy source.
///
/// Falls back to a process-wide counter when getrandom is unavailable, so ids
/// and seeds stay distinct within a session.
pub(crate) fn fill_random(buf: &mut [u8]) {
    if getrandom::getrandom(buf).is_ok() {
        return;
    }
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    tracing::warn!("getrandom failed, using counter-derived bytes");
    for chunk in buf.chunks_mut(8) {
        let counter = COUNTER.fetch_add(1, Ordering::Relaxed);
        let bytes = counter.wrapping_mul(0x9E37_79B9_7F4A_7C15).to_le_bytes();
        chunk.copy_from_slice(&bytes[..chunk.len()]);
    }
}

/// Generate a fresh seed in `1..SEED_RANGE`.
///
/// Zero is skipped: a zero seed in a share link means "pick one for me".
pub fn generate_seed() -> GameSeed {
    let mut seed_bytes = [0u8; 8];
    fill_random(&mut seed_bytes);
    u64::from_le_bytes(seed_bytes) % (SEED_RANGE - 1) + 1
}
