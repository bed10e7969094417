use crate::country::Country;
use crate::error::QuizError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Difficulty tier. Each tier draws from a fixed band of the population-ranked catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

/// Catalog ranks drawn on easy
pub const EASY_BAND: Range<usize> = 0..30;
/// Catalog ranks drawn on medium
pub const MEDIUM_BAND: Range<usize> = 30..80;
/// Catalog ranks drawn on hard
pub const HARD_BAND: Range<usize> = 80..200;

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Population-rank band this tier draws from
    pub fn band(self) -> Range<usize> {
        match self {
            Difficulty::Easy => EASY_BAND,
            Difficulty::Medium => MEDIUM_BAND,
            Difficulty::Hard => HARD_BAND,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Difficulty::Easy => "🟢",
            Difficulty::Medium => "🟡",
            Difficulty::Hard => "🔴",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(QuizError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// Slice of a population-descending catalog for `difficulty`.
///
/// A catalog shorter than the band's upper bound yields whatever is available,
/// which may be empty for `Hard` on small catalogs.
pub fn partition(catalog: &[Country], difficulty: Difficulty) -> &[Country] {
    let band = difficulty.band();
    let start = band.start.min(catalog.len());
    let end = band.end.min(catalog.len());
    &catalog[start..end]
}
