use crate::country::ClueType;

/// Points for an instant, clue-free correct guess
pub const BASE_SCORE: u32 = 1000;
/// Deducted per revealed clue
pub const CLUE_PENALTY: u32 = 100;
/// Deducted per guess used
pub const GUESS_PENALTY: u32 = 150;
/// Guesses available per round
pub const MAX_GUESSES: u32 = 3;

/// Score for a round won with `clues_revealed` clues and `guesses_remaining`
/// guesses left after the winning guess.
///
/// Score formula: max(0, 1000 - clues * 100 - (3 - remaining) * 150).
/// Inputs are clamped to [0, 6] clues and [0, 3] remaining guesses.
pub fn score(clues_revealed: usize, guesses_remaining: u32) -> u32 {
    let clues = clues_revealed.min(ClueType::ALL.len()) as u32;
    let remaining = guesses_remaining.min(MAX_GUESSES);
    let penalty = clues * CLUE_PENALTY + (MAX_GUESSES - remaining) * GUESS_PENALTY;
    BASE_SCORE.saturating_sub(penalty)
}
