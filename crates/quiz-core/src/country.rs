use crate::error::QuizError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A country in the catalog. Built once from the catalog source and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Display name, also the key a guess is matched against
    pub name: String,
    /// ISO 3166-1 alpha-2 code
    pub code: String,
    /// ISO 3166-1 alpha-3 code (outline lookup key)
    pub code3: String,
    pub capital: String,
    pub population: u64,
    pub region: String,
    /// Flag image URL
    pub flag: String,
    /// Map link
    pub maps: String,
    pub exports: Vec<String>,
    pub fun_fact: String,
}

impl Country {
    /// Whether a free-text guess names this country (trimmed, case-insensitive, exact)
    pub fn matches_guess(&self, guess: &str) -> bool {
        normalize_name(guess) == normalize_name(&self.name)
    }

    /// Text shown for a revealed clue
    pub fn clue_text(&self, clue: ClueType) -> String {
        match clue {
            ClueType::Flag => self.flag.clone(),
            ClueType::Map => self.code3.clone(),
            ClueType::Capital => self.capital.clone(),
            ClueType::Export => self.exports.join(", "),
            ClueType::Fact => self.fun_fact.clone(),
            ClueType::Region => self.region.clone(),
        }
    }
}

/// Normalization used for guess matching
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// The six revealable clue kinds. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueType {
    Flag,
    Map,
    Capital,
    Export,
    Fact,
    Region,
}

impl ClueType {
    pub const ALL: [ClueType; 6] = [
        ClueType::Flag,
        ClueType::Map,
        ClueType::Capital,
        ClueType::Export,
        ClueType::Fact,
        ClueType::Region,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ClueType::Flag => "flag",
            ClueType::Map => "map",
            ClueType::Capital => "capital",
            ClueType::Export => "export",
            ClueType::Fact => "fact",
            ClueType::Region => "region",
        }
    }

    /// Emoji used in share texts
    pub fn emoji(self) -> &'static str {
        match self {
            ClueType::Flag => "🏴",
            ClueType::Map => "🗺️",
            ClueType::Capital => "🏛️",
            ClueType::Export => "📦",
            ClueType::Fact => "💡",
            ClueType::Region => "🌍",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClueType::Flag => "Flag",
            ClueType::Map => "Outline map",
            ClueType::Capital => "Capital",
            ClueType::Export => "Main exports",
            ClueType::Fact => "Fun fact",
            ClueType::Region => "Region",
        }
    }
}

impl fmt::Display for ClueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClueType {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "flag" => Ok(ClueType::Flag),
            "map" => Ok(ClueType::Map),
            "capital" => Ok(ClueType::Capital),
            "export" | "exports" => Ok(ClueType::Export),
            "fact" => Ok(ClueType::Fact),
            "region" => Ok(ClueType::Region),
            _ => Err(QuizError::UnknownClue(s.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Country;

    /// Minimal country for unit tests
    pub fn country(name: &str, population: u64) -> Country {
        Country {
            name: name.to_string(),
            code: name.chars().take(2).collect::<String>().to_uppercase(),
            code3: name.chars().take(3).collect::<String>().to_uppercase(),
            capital: format!("{} City", name),
            population,
            region: "Testland".to_string(),
            flag: format!("https://flags.example/{}.svg", name),
            maps: String::new(),
            exports: vec!["Widgets".to_string()],
            fun_fact: "Exists for tests.".to_string(),
        }
    }

    /// `n` countries named C000.. with strictly descending population
    pub fn catalog(n: usize) -> Vec<Country> {
        (0..n)
            .map(|i| country(&format!("C{:03}", i), (n - i) as u64 * 1000))
            .collect()
    }
}
