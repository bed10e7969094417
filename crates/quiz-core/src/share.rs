//! Share links and share texts

use crate::country::ClueType;
use crate::difficulty::Difficulty;
use crate::error::{QuizError, QuizResult};
use crate::game::{GameState, RoundStatus};
use crate::rng::GameSeed;
use crate::scoring::MAX_GUESSES;
use crate::stats::UserAchievements;
use std::fmt;
use std::str::FromStr;

/// Everything needed to replay someone else's game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareLink {
    pub seed: GameSeed,
    pub difficulty: Difficulty,
}

impl ShareLink {
    pub fn new(seed: GameSeed, difficulty: Difficulty) -> Self {
        Self { seed, difficulty }
    }

    /// Link for a started game; `None` before the first game
    pub fn for_game(state: &GameState) -> Option<Self> {
        state.seed().map(|seed| Self::new(seed, state.difficulty()))
    }

    /// Parse a query string or a full URL.
    ///
    /// Unknown parameters are ignored. Both `seed` and `difficulty` must be present.
    pub fn parse(input: &str) -> QuizResult<Self> {
        let without_fragment = input.split('#').next().unwrap_or_default();
        let query = match without_fragment.split_once('?') {
            Some((_, query)) => query,
            None => without_fragment,
        };

        let mut seed = None;
        let mut difficulty = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "seed" => {
                    seed = Some(value.trim().parse::<GameSeed>().map_err(|_| {
                        QuizError::InvalidShareLink(format!("seed '{value}' is not an integer"))
                    })?)
                }
                "difficulty" => difficulty = Some(value.parse::<Difficulty>()?),
                _ => {}
            }
        }

        match (seed, difficulty) {
            (Some(seed), Some(difficulty)) => Ok(Self { seed, difficulty }),
            (None, _) => Err(QuizError::InvalidShareLink("missing seed".into())),
            (_, None) => Err(QuizError::InvalidShareLink("missing difficulty".into())),
        }
    }

    /// `?seed=<n>&difficulty=<tier>`
    pub fn to_query(&self) -> String {
        format!("?seed={}&difficulty={}", self.seed, self.difficulty)
    }

    /// The query appended to `base`, replacing any query `base` already has
    pub fn url(&self, base: &str) -> String {
        let base = base.split(['?', '#']).next().unwrap_or_default();
        format!("{base}{}", self.to_query())
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

impl FromStr for ShareLink {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn result_emoji(won: bool) -> &'static str {
    if won {
        "✅"
    } else {
        "❌"
    }
}

/// End-of-game challenge with one line per finished round and a replay link
pub fn game_share_text(state: &GameState, base_url: &str) -> String {
    let rounds: Vec<String> = state
        .round_results()
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "Round {}: {} {} ({} pts)",
                i + 1,
                r.country.name,
                result_emoji(r.won),
                r.score
            )
        })
        .collect();
    let link = ShareLink::for_game(state)
        .map(|link| link.url(base_url))
        .unwrap_or_default();

    format!(
        "Country Quiz {} Challenge!\n\n{}\n\nTotal Score: {}\n\nCan you beat my score? Play the same game:\n{}",
        state.difficulty().emoji(),
        rounds.join("\n"),
        state.total_score(),
        link
    )
}

/// Summary of the active round, or an invitation while it is still being played
pub fn round_share_text(state: &GameState) -> String {
    let country = match state.current_country() {
        Some(country) if state.status() != RoundStatus::Playing => country,
        _ => return "Play Country Quiz and share your results!".to_string(),
    };

    let clues: String = state
        .revealed_clues()
        .iter()
        .map(|c| c.emoji())
        .collect();

    format!(
        "Country Quiz {} {}\n\n\
         Country: {}\n\
         Difficulty: {}\n\
         Score: {}\n\
         Clues: {} ({}/{})\n\
         Guesses: {}/{}\n\n\
         Can you beat my score? Play at Country Quiz!",
        state.difficulty().emoji(),
        result_emoji(state.status() == RoundStatus::Won),
        country.name,
        state.difficulty().as_str().to_uppercase(),
        state.score(),
        clues,
        state.revealed_clues().len(),
        ClueType::ALL.len(),
        state.guesses_used(),
        MAX_GUESSES
    )
}

/// Lifetime statistics, or an invitation when none are available
pub fn stats_share_text(achievements: Option<&UserAchievements>) -> String {
    let Some(a) = achievements else {
        return "Play Country Quiz to build your stats!".to_string();
    };

    format!(
        "My Country Quiz Stats 📊\n\n\
         🎮 Games Played: {}\n\
         ✅ Wins: {}\n\
         📈 Win Rate: {:.1}%\n\
         🔥 Best Streak: {}\n\
         ⭐ Perfect Games: {}\n\n\
         🟢 Easy Wins: {}\n\
         🟡 Medium Wins: {}\n\
         🔴 Hard Wins: {}\n\n\
         💡 Avg Clues Used: {:.1}\n\n\
         Try to beat my record at Country Quiz!",
        a.total_games,
        a.total_wins,
        a.win_rate(),
        a.best_streak,
        a.perfect_games,
        a.easy_wins,
        a.medium_wins,
        a.hard_wins,
        a.avg_clues()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::test_support::catalog;
    use crate::game::Action;

    #[test]
    fn test_parse_query() {
        let link = ShareLink::parse("?seed=42&difficulty=hard").unwrap();
        assert_eq!(link, ShareLink::new(42, Difficulty::Hard));
        assert_eq!(link.to_query(), "?seed=42&difficulty=hard");
    }

    #[test]
    fn test_parse_full_url_with_extra_params() {
        let link: ShareLink = "https://quiz.example/play?utm=x&difficulty=medium&seed=777#top"
            .parse()
            .unwrap();
        assert_eq!(link, ShareLink::new(777, Difficulty::Medium));
    }

    #[test]
    fn test_parse_rejects_bad_links() {
        for bad in [
            "?difficulty=easy",
            "?seed=12",
            "?seed=abc&difficulty=easy",
            "?seed=-5&difficulty=easy",
            "?seed=5&difficulty=expert",
            "",
        ] {
            assert!(ShareLink::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_url_replaces_existing_query() {
        let link = ShareLink::new(9, Difficulty::Easy);
        assert_eq!(
            link.url("https://quiz.example/?seed=1&difficulty=hard"),
            "https://quiz.example/?seed=9&difficulty=easy"
        );
    }

    #[test]
    fn test_round_text_placeholder_while_playing() {
        let mut state = GameState::new();
        assert_eq!(round_share_text(&state), "Play Country Quiz and share your results!");
        state.start_new_game(&catalog(100), Difficulty::Easy, Some(42)).unwrap();
        assert_eq!(round_share_text(&state), "Play Country Quiz and share your results!");
    }

    #[test]
    fn test_round_text_after_win() {
        let mut state = GameState::new();
        state.start_new_game(&catalog(100), Difficulty::Easy, Some(42)).unwrap();
        state.apply(Action::RevealClue(ClueType::Flag));
        state.apply(Action::RevealClue(ClueType::Region));
        let answer = state.current_country().unwrap().name.clone();
        state.apply(Action::MakeGuess(answer.clone()));

        let text = round_share_text(&state);
        assert!(text.starts_with("Country Quiz 🟢 ✅"));
        assert!(text.contains(&format!("Country: {answer}")));
        assert!(text.contains("Difficulty: EASY"));
        assert!(text.contains("Score: 650"));
        assert!(text.contains("Clues: 🏴🌍 (2/6)"));
        assert!(text.contains("Guesses: 1/3"));
    }

    #[test]
    fn test_game_text() {
        let mut state = GameState::new();
        state.start_new_game(&catalog(100), Difficulty::Medium, Some(42)).unwrap();
        let first = state.current_country().unwrap().name.clone();
        state.apply(Action::MakeGuess(first.clone()));
        state.apply(Action::NextRound);
        let second = state.current_country().unwrap().name.clone();
        state.apply(Action::GiveUp);

        let text = game_share_text(&state, "https://quiz.example/");
        assert!(text.starts_with("Country Quiz 🟡 Challenge!"));
        assert!(text.contains(&format!("Round 1: {first} ✅ (850 pts)")));
        assert!(text.contains(&format!("Round 2: {second} ❌ (0 pts)")));
        assert!(text.contains("Total Score: 850"));
        assert!(text.ends_with("https://quiz.example/?seed=42&difficulty=medium"));
    }

    #[test]
    fn test_stats_text() {
        assert_eq!(stats_share_text(None), "Play Country Quiz to build your stats!");

        let mut a = UserAchievements::new("u", 0);
        a.total_games = 3;
        a.total_wins = 2;
        a.total_clues_used = 4;
        a.best_streak = 2;
        let text = stats_share_text(Some(&a));
        assert!(text.contains("📈 Win Rate: 66.7%"));
        assert!(text.contains("💡 Avg Clues Used: 1.3"));
        assert!(text.contains("🔥 Best Streak: 2"));

        let empty = stats_share_text(Some(&UserAchievements::new("u", 0)));
        assert!(empty.contains("Win Rate: 0.0%"));
        assert!(empty.contains("Avg Clues Used: 0.0"));
    }
}
