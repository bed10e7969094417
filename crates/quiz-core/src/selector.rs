//! Seeded round selection

use crate::rng::{GameSeed, SeededRandom};

/// Shuffle a slice in place using seeded Fisher-Yates.
///
/// Indices are visited from the end down to 1 with a single generator; share
/// links depend on this exact traversal.
pub fn shuffle<T>(slice: &mut [T], rng: &mut SeededRandom) {
    for i in (1..slice.len()).rev() {
        let j = rng.next_int(0, i);
        slice.swap(i, j);
    }
}

/// Shuffle a copy of `pool` with `seed` and keep the first `count` items
pub fn select_rounds<T: Clone>(pool: &[T], count: usize, seed: GameSeed) -> Vec<T> {
    let mut shuffled = pool.to_vec();
    let mut rng = SeededRandom::new(seed);
    shuffle(&mut shuffled, &mut rng);
    shuffled.truncate(count.min(pool.len()));
    shuffled
}
