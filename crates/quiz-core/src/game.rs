//! Game state machine
//!
//! [`GameState`] is a reducer: every operation takes the current state plus an
//! [`Action`] and either applies a transition or reports why it was ignored.
//! Invalid calls never fail and never modify the state. Round resolutions are
//! queued as [`GameEvent`]s for the host to hand to the statistics layer, so the
//! game itself never waits on persistence.

use crate::country::{ClueType, Country};
use crate::difficulty::{partition, Difficulty};
use crate::error::{QuizError, QuizResult};
use crate::rng::{generate_seed, GameSeed};
use crate::scoring::{self, MAX_GUESSES};
use crate::selector::select_rounds;
use serde::{Deserialize, Serialize};

/// Rounds per game
pub const TOTAL_ROUNDS: usize = 5;

/// Status of the active round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundStatus {
    #[default]
    Playing,
    Won,
    Lost,
}

impl RoundStatus {
    pub fn is_resolved(self) -> bool {
        self != RoundStatus::Playing
    }
}

/// Snapshot taken when a round resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundResult {
    pub country: Country,
    pub won: bool,
    pub score: u32,
    pub clues_used: usize,
    pub guesses_used: u32,
}

/// A resolved round, waiting to be recorded in the statistics store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResolved {
    pub country_name: String,
    pub difficulty: Difficulty,
    pub clues_used: usize,
    pub guesses_made: u32,
    pub won: bool,
    pub score: u32,
    /// Revealed clue kinds in reveal order
    pub clues_revealed: Vec<ClueType>,
}

/// Side effects emitted by the state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundResolved(RoundResolved),
}

/// Player actions within a started game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RevealClue(ClueType),
    MakeGuess(String),
    GiveUp,
    NextRound,
    ResetGame,
}

/// Why an action left the state unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    /// The round is already won or lost
    RoundOver,
    /// No game has been started, or the difficulty band was empty
    NoCurrentCountry,
    /// The clue was revealed earlier this round
    AlreadyRevealed,
    /// There is no further precomputed round
    NoMoreRounds,
}

/// Outcome of applying an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored(IgnoredReason),
}

impl Transition {
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

/// Full state of a game session, including the active round.
///
/// Deserialization checks the fields against each other, so a tampered or
/// corrupt saved game is refused instead of loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SavedGameState")]
pub struct GameState {
    current_country: Option<Country>,
    difficulty: Difficulty,
    /// Revealed clues in reveal order, no duplicates
    revealed_clues: Vec<ClueType>,
    guesses_remaining: u32,
    status: RoundStatus,
    score: u32,
    round_number: usize,
    total_rounds: usize,
    round_scores: Vec<u32>,
    show_correct_feedback: bool,
    seed: Option<GameSeed>,
    selected_countries: Vec<Country>,
    round_results: Vec<RoundResult>,
    /// Events not yet handed to the host
    #[serde(skip)]
    outbox: Vec<GameEvent>,
}

/// Serialized form of [`GameState`] before validation
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedGameState {
    current_country: Option<Country>,
    difficulty: Difficulty,
    revealed_clues: Vec<ClueType>,
    guesses_remaining: u32,
    status: RoundStatus,
    score: u32,
    round_number: usize,
    total_rounds: usize,
    round_scores: Vec<u32>,
    show_correct_feedback: bool,
    seed: Option<GameSeed>,
    selected_countries: Vec<Country>,
    round_results: Vec<RoundResult>,
}

impl TryFrom<SavedGameState> for GameState {
    type Error = QuizError;

    fn try_from(saved: SavedGameState) -> QuizResult<Self> {
        let state = GameState {
            current_country: saved.current_country,
            difficulty: saved.difficulty,
            revealed_clues: saved.revealed_clues,
            guesses_remaining: saved.guesses_remaining,
            status: saved.status,
            score: saved.score,
            round_number: saved.round_number,
            total_rounds: saved.total_rounds,
            round_scores: saved.round_scores,
            show_correct_feedback: saved.show_correct_feedback,
            seed: saved.seed,
            selected_countries: saved.selected_countries,
            round_results: saved.round_results,
            outbox: Vec::new(),
        };
        state.validate()?;
        Ok(state)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// The pre-game state: no country, round 1, empty accumulators
    pub fn new() -> Self {
        Self {
            current_country: None,
            difficulty: Difficulty::Easy,
            revealed_clues: Vec::new(),
            guesses_remaining: MAX_GUESSES,
            status: RoundStatus::Playing,
            score: 0,
            round_number: 1,
            total_rounds: TOTAL_ROUNDS,
            round_scores: Vec::new(),
            show_correct_feedback: false,
            seed: None,
            selected_countries: Vec::new(),
            round_results: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// Start a game from a population-descending catalog.
    ///
    /// A missing or zero seed is replaced by a freshly generated one. The
    /// effective seed is returned so the host can publish a share link.
    pub fn start_new_game(
        &mut self,
        catalog: &[Country],
        difficulty: Difficulty,
        seed: Option<GameSeed>,
    ) -> QuizResult<GameSeed> {
        if catalog.is_empty() {
            return Err(QuizError::CatalogUnavailable(
                "catalog must be loaded before starting a game".to_string(),
            ));
        }

        let game_seed = match seed {
            Some(s) if s != 0 => s,
            _ => generate_seed(),
        };
        let pool = partition(catalog, difficulty);
        let selected_countries = select_rounds(pool, TOTAL_ROUNDS, game_seed);

        tracing::debug!(
            %difficulty,
            seed = game_seed,
            pool = pool.len(),
            rounds = selected_countries.len(),
            "starting new game"
        );

        *self = Self {
            current_country: selected_countries.first().cloned(),
            difficulty,
            seed: Some(game_seed),
            selected_countries,
            ..Self::new()
        };
        Ok(game_seed)
    }

    /// Check that the fields describe a state the reducer can reach
    pub fn validate(&self) -> QuizResult<()> {
        let invalid = |msg: String| Err(QuizError::InvalidGameState(msg));

        if self.total_rounds != TOTAL_ROUNDS {
            return invalid(format!("total rounds {} is not {TOTAL_ROUNDS}", self.total_rounds));
        }
        if self.guesses_remaining > MAX_GUESSES {
            return invalid(format!(
                "{} guesses remaining exceeds {MAX_GUESSES}",
                self.guesses_remaining
            ));
        }
        if self.round_number == 0 || self.round_number > self.total_rounds {
            return invalid(format!("round {} is out of range", self.round_number));
        }
        if self.selected_countries.len() > self.total_rounds {
            return invalid(format!("{} countries selected", self.selected_countries.len()));
        }
        if self.round_scores.len() != self.round_number - 1 {
            return invalid(format!(
                "{} finished round scores for round {}",
                self.round_scores.len(),
                self.round_number
            ));
        }
        if self.round_results.len() > self.round_number {
            return invalid(format!(
                "{} results for round {}",
                self.round_results.len(),
                self.round_number
            ));
        }

        let expected = self.selected_countries.get(self.round_number - 1);
        if self.current_country.as_ref() != expected {
            return invalid(format!("current country does not match round {}", self.round_number));
        }
        if self.current_country.is_none() && self.round_number != 1 {
            return invalid(format!("round {} without a country", self.round_number));
        }

        for (i, clue) in self.revealed_clues.iter().enumerate() {
            if self.revealed_clues[..i].contains(clue) {
                return invalid(format!("clue {clue} revealed twice"));
            }
        }
        if self.status != RoundStatus::Won && self.score != 0 {
            return invalid(format!("score {} on a round that was not won", self.score));
        }
        Ok(())
    }

    /// Apply a player action
    pub fn apply(&mut self, action: Action) -> Transition {
        match action {
            Action::RevealClue(clue) => self.reveal_clue(clue),
            Action::MakeGuess(guess) => self.make_guess(&guess),
            Action::GiveUp => self.give_up(),
            Action::NextRound => self.next_round(),
            Action::ResetGame => self.reset_game(),
        }
    }

    pub fn reveal_clue(&mut self, clue: ClueType) -> Transition {
        if self.status != RoundStatus::Playing {
            return Transition::Ignored(IgnoredReason::RoundOver);
        }
        if self.revealed_clues.contains(&clue) {
            return Transition::Ignored(IgnoredReason::AlreadyRevealed);
        }
        self.revealed_clues.push(clue);
        tracing::debug!(%clue, revealed = self.revealed_clues.len(), "clue revealed");
        Transition::Applied
    }

    pub fn make_guess(&mut self, guess: &str) -> Transition {
        if self.status != RoundStatus::Playing {
            return Transition::Ignored(IgnoredReason::RoundOver);
        }
        let Some(country) = self.current_country.clone() else {
            return Transition::Ignored(IgnoredReason::NoCurrentCountry);
        };

        let correct = country.matches_guess(guess);
        self.guesses_remaining = self.guesses_remaining.saturating_sub(1);
        tracing::debug!(correct, remaining = self.guesses_remaining, "guess made");

        if correct {
            self.status = RoundStatus::Won;
            self.score = scoring::score(self.revealed_clues.len(), self.guesses_remaining);
            self.show_correct_feedback = true;
            self.resolve_round(country, self.guesses_used());
        } else if self.guesses_remaining == 0 {
            self.status = RoundStatus::Lost;
            self.score = 0;
            self.show_correct_feedback = false;
            self.resolve_round(country, MAX_GUESSES);
        }
        Transition::Applied
    }

    /// Forfeit the round. Guesses used records what was actually consumed.
    pub fn give_up(&mut self) -> Transition {
        if self.status != RoundStatus::Playing {
            return Transition::Ignored(IgnoredReason::RoundOver);
        }
        let Some(country) = self.current_country.clone() else {
            return Transition::Ignored(IgnoredReason::NoCurrentCountry);
        };

        let guesses_used = self.guesses_used();
        self.guesses_remaining = 0;
        self.status = RoundStatus::Lost;
        self.score = 0;
        self.show_correct_feedback = false;
        self.resolve_round(country, guesses_used);
        Transition::Applied
    }

    pub fn next_round(&mut self) -> Transition {
        let next = self.round_number + 1;
        if next > self.total_rounds || next > self.selected_countries.len() {
            return Transition::Ignored(IgnoredReason::NoMoreRounds);
        }

        self.round_scores.push(self.score);
        self.current_country = Some(self.selected_countries[next - 1].clone());
        self.revealed_clues.clear();
        self.guesses_remaining = MAX_GUESSES;
        self.status = RoundStatus::Playing;
        self.score = 0;
        self.round_number = next;
        self.show_correct_feedback = false;
        tracing::debug!(round = next, "advanced to next round");
        Transition::Applied
    }

    pub fn reset_game(&mut self) -> Transition {
        *self = Self::new();
        Transition::Applied
    }

    fn resolve_round(&mut self, country: Country, guesses_used: u32) {
        let won = self.status == RoundStatus::Won;
        let clues_used = self.revealed_clues.len();

        self.round_results.push(RoundResult {
            country: country.clone(),
            won,
            score: self.score,
            clues_used,
            guesses_used,
        });
        self.outbox.push(GameEvent::RoundResolved(RoundResolved {
            country_name: country.name,
            difficulty: self.difficulty,
            clues_used,
            guesses_made: guesses_used,
            won,
            score: self.score,
            clues_revealed: self.revealed_clues.clone(),
        }));
        tracing::debug!(won, score = self.score, round = self.round_number, "round resolved");
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.outbox
    }

    pub fn current_country(&self) -> Option<&Country> {
        self.current_country.as_ref()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn revealed_clues(&self) -> &[ClueType] {
        &self.revealed_clues
    }

    pub fn is_revealed(&self, clue: ClueType) -> bool {
        self.revealed_clues.contains(&clue)
    }

    pub fn guesses_remaining(&self) -> u32 {
        self.guesses_remaining
    }

    pub fn guesses_used(&self) -> u32 {
        MAX_GUESSES.saturating_sub(self.guesses_remaining)
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    /// Score of the active round (0 until it is won)
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn round_number(&self) -> usize {
        self.round_number
    }

    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    /// Rounds actually playable: the catalog band may hold fewer than five countries
    pub fn playable_rounds(&self) -> usize {
        self.total_rounds.min(self.selected_countries.len())
    }

    pub fn round_scores(&self) -> &[u32] {
        &self.round_scores
    }

    pub fn round_results(&self) -> &[RoundResult] {
        &self.round_results
    }

    pub fn show_correct_feedback(&self) -> bool {
        self.show_correct_feedback
    }

    pub fn seed(&self) -> Option<GameSeed> {
        self.seed
    }

    pub fn selected_countries(&self) -> &[Country] {
        &self.selected_countries
    }

    /// Sum of finished round scores plus the active round
    pub fn total_score(&self) -> u32 {
        self.round_scores.iter().sum::<u32>() + self.score
    }

    /// Whether the active round is the last one of the game
    pub fn is_final_round(&self) -> bool {
        self.round_number >= self.total_rounds
    }

    /// Whether the whole game is over: final round reached and resolved
    pub fn is_game_complete(&self) -> bool {
        self.status.is_resolved() && self.round_number >= self.playable_rounds()
    }
}

/// Pure form of [`GameState::apply`]
pub fn reduce(state: &GameState, action: Action) -> (GameState, Transition) {
    let mut next = state.clone();
    let transition = next.apply(action);
    (next, transition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::test_support::catalog;

    fn started(seed: GameSeed) -> GameState {
        let mut state = GameState::new();
        state
            .start_new_game(&catalog(250), Difficulty::Easy, Some(seed))
            .unwrap();
        state
    }

    fn answer(state: &GameState) -> String {
        state.current_country().unwrap().name.clone()
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::new();
        assert!(state.current_country().is_none());
        assert_eq!(state.round_number(), 1);
        assert_eq!(state.total_rounds(), 5);
        assert_eq!(state.guesses_remaining(), 3);
        assert_eq!(state.status(), RoundStatus::Playing);
        assert!(state.round_results().is_empty());
        assert!(state.seed().is_none());
    }

    #[test]
    fn test_start_requires_catalog() {
        let mut state = GameState::new();
        let err = state.start_new_game(&[], Difficulty::Easy, Some(1));
        assert!(matches!(err, Err(QuizError::CatalogUnavailable(_))));
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_start_is_reproducible() {
        let a = started(42);
        let b = started(42);
        assert_eq!(a.selected_countries(), b.selected_countries());
        assert_eq!(a.selected_countries().len(), 5);
        assert_eq!(a.seed(), Some(42));
        assert_eq!(a.current_country(), a.selected_countries().first());
        let names: Vec<&str> = a.selected_countries().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["C010", "C005", "C024", "C011", "C000"]);
    }

    #[test]
    fn test_zero_or_missing_seed_is_generated() {
        let mut state = GameState::new();
        let seed = state.start_new_game(&catalog(50), Difficulty::Easy, Some(0)).unwrap();
        assert_eq!(state.seed(), Some(seed));
        let seed = state.start_new_game(&catalog(50), Difficulty::Easy, None).unwrap();
        assert_eq!(state.seed(), Some(seed));
    }

    #[test]
    fn test_reveal_clue() {
        let mut state = started(7);
        assert!(state.reveal_clue(ClueType::Flag).is_applied());
        assert_eq!(
            state.reveal_clue(ClueType::Flag),
            Transition::Ignored(IgnoredReason::AlreadyRevealed)
        );
        assert!(state.reveal_clue(ClueType::Region).is_applied());
        assert_eq!(state.revealed_clues(), &[ClueType::Flag, ClueType::Region]);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn test_correct_guess_wins() {
        let mut state = started(7);
        state.reveal_clue(ClueType::Capital);
        state.reveal_clue(ClueType::Flag);
        state.make_guess("wrong");
        let guess = format!("  {}  ", answer(&state).to_uppercase());
        assert!(state.make_guess(&guess).is_applied());

        assert_eq!(state.status(), RoundStatus::Won);
        assert_eq!(state.guesses_remaining(), 1);
        assert_eq!(state.score(), 500);
        assert!(state.show_correct_feedback());

        let result = &state.round_results()[0];
        assert!(result.won);
        assert_eq!(result.score, 500);
        assert_eq!(result.clues_used, 2);
        assert_eq!(result.guesses_used, 2);

        let events = state.drain_events();
        assert_eq!(events.len(), 1);
        let GameEvent::RoundResolved(ev) = &events[0];
        assert!(ev.won);
        assert_eq!(ev.guesses_made, 2);
        assert_eq!(ev.clues_revealed, vec![ClueType::Capital, ClueType::Flag]);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_win_on_last_guess() {
        let mut state = started(7);
        state.make_guess("nope");
        state.make_guess("still nope");
        let name = answer(&state);
        state.make_guess(&name);
        assert_eq!(state.status(), RoundStatus::Won);
        assert_eq!(state.guesses_remaining(), 0);
        assert_eq!(state.score(), 550);
    }

    #[test]
    fn test_three_misses_lose() {
        let mut state = started(7);
        state.reveal_clue(ClueType::Fact);
        state.make_guess("a");
        state.make_guess("b");
        assert_eq!(state.status(), RoundStatus::Playing);
        assert!(state.round_results().is_empty());
        assert!(state.pending_events().is_empty());

        state.make_guess("c");
        assert_eq!(state.status(), RoundStatus::Lost);
        assert_eq!(state.score(), 0);
        assert_eq!(state.guesses_remaining(), 0);
        let result = &state.round_results()[0];
        assert!(!result.won);
        assert_eq!(result.guesses_used, 3);
        assert_eq!(result.clues_used, 1);
        assert_eq!(state.pending_events().len(), 1);
    }

    #[test]
    fn test_resolved_round_ignores_actions() {
        let mut state = started(7);
        let name = answer(&state);
        state.make_guess(&name);
        let snapshot = state.clone();

        assert_eq!(
            state.make_guess(&name),
            Transition::Ignored(IgnoredReason::RoundOver)
        );
        assert_eq!(
            state.reveal_clue(ClueType::Map),
            Transition::Ignored(IgnoredReason::RoundOver)
        );
        assert_eq!(state.give_up(), Transition::Ignored(IgnoredReason::RoundOver));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_guess_before_start_is_ignored() {
        let mut state = GameState::new();
        assert_eq!(
            state.make_guess("France"),
            Transition::Ignored(IgnoredReason::NoCurrentCountry)
        );
        assert_eq!(
            state.give_up(),
            Transition::Ignored(IgnoredReason::NoCurrentCountry)
        );
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_give_up_records_consumed_guesses() {
        let mut state = started(11);
        state.make_guess("x");
        state.reveal_clue(ClueType::Export);
        assert!(state.give_up().is_applied());
        assert_eq!(state.status(), RoundStatus::Lost);
        assert_eq!(state.guesses_remaining(), 0);
        assert_eq!(state.score(), 0);
        assert_eq!(state.round_results()[0].guesses_used, 1);

        let mut fresh = started(11);
        fresh.give_up();
        assert_eq!(fresh.round_results()[0].guesses_used, 0);
    }

    #[test]
    fn test_next_round_progression() {
        let mut state = started(3);
        let name = answer(&state);
        state.make_guess(&name);
        assert!(state.next_round().is_applied());

        assert_eq!(state.round_number(), 2);
        // a first-guess win leaves two guesses: 1000 - 150
        assert_eq!(state.round_scores(), &[850]);
        assert_eq!(state.status(), RoundStatus::Playing);
        assert_eq!(state.guesses_remaining(), 3);
        assert!(state.revealed_clues().is_empty());
        assert_eq!(state.score(), 0);
        assert!(!state.show_correct_feedback());
        assert_eq!(state.current_country(), state.selected_countries().get(1));
    }

    #[test]
    fn test_next_round_at_last_round_is_noop() {
        let mut state = started(3);
        for _ in 0..4 {
            state.give_up();
            assert!(state.next_round().is_applied());
        }
        assert_eq!(state.round_number(), 5);
        state.give_up();
        let snapshot = state.clone();
        assert_eq!(
            state.next_round(),
            Transition::Ignored(IgnoredReason::NoMoreRounds)
        );
        assert_eq!(state, snapshot);
        assert!(state.is_game_complete());
        assert_eq!(state.round_results().len(), 5);
    }

    #[test]
    fn test_small_band_caps_rounds() {
        let mut state = GameState::new();
        // 82 countries leave only two in the hard band
        state
            .start_new_game(&catalog(82), Difficulty::Hard, Some(9))
            .unwrap();
        assert_eq!(state.selected_countries().len(), 2);
        assert_eq!(state.playable_rounds(), 2);
        state.give_up();
        assert!(state.next_round().is_applied());
        assert!(!state.is_game_complete());
        state.give_up();
        assert!(!state.next_round().is_applied());
        assert_eq!(state.round_number(), 2);
        assert!(state.is_game_complete());
    }

    #[test]
    fn test_empty_band_starts_without_country() {
        let mut state = GameState::new();
        state
            .start_new_game(&catalog(20), Difficulty::Hard, Some(9))
            .unwrap();
        assert!(state.current_country().is_none());
        assert!(!state.make_guess("C000").is_applied());
        assert!(!state.next_round().is_applied());
    }

    #[test]
    fn test_total_score() {
        let mut state = started(5);
        let name = answer(&state);
        state.make_guess(&name);
        state.next_round();
        state.reveal_clue(ClueType::Flag);
        let name = answer(&state);
        state.make_guess(&name);
        assert_eq!(state.total_score(), 850 + 750);
    }

    #[test]
    fn test_reset_game() {
        let mut state = started(5);
        state.make_guess("x");
        state.reset_game();
        assert_eq!(state, GameState::new());
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = started(5);
        let (next, transition) = reduce(&state, Action::RevealClue(ClueType::Region));
        assert!(transition.is_applied());
        assert!(state.revealed_clues().is_empty());
        assert_eq!(next.revealed_clues(), &[ClueType::Region]);
    }

    #[test]
    fn test_state_serialization() {
        let mut state = started(5);
        state.reveal_clue(ClueType::Map);
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"revealedClues\":[\"map\"]"));
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    fn tampered(state: &GameState, field: &str, value: serde_json::Value) -> serde_json::Result<GameState> {
        let mut json = serde_json::to_value(state).unwrap();
        json[field] = value;
        serde_json::from_value(json)
    }

    #[test]
    fn test_tampered_state_rejected() {
        let mut state = started(5);
        state.next_round();

        let err = tampered(&state, "guessesRemaining", 5.into()).unwrap_err();
        assert!(err.to_string().contains("guesses remaining"));
        assert!(tampered(&state, "roundNumber", 0.into()).is_err());
        assert!(tampered(&state, "roundNumber", 6.into()).is_err());
        assert!(tampered(&state, "totalRounds", 9.into()).is_err());
        assert!(tampered(&state, "roundScores", serde_json::json!([])).is_err());
        assert!(tampered(&state, "revealedClues", serde_json::json!(["map", "map"])).is_err());
        assert!(tampered(&state, "score", 900.into()).is_err());

        let other = serde_json::to_value(&state.selected_countries()[0]).unwrap();
        assert!(tampered(&state, "currentCountry", other).is_err());

        assert_eq!(tampered(&state, "showCorrectFeedback", true.into()).unwrap().round_number(), 2);
    }

    #[test]
    fn test_guesses_used_never_underflows() {
        let mut state = started(5);
        state.guesses_remaining = MAX_GUESSES + 2;
        assert_eq!(state.guesses_used(), 0);
        assert!(state.give_up().is_applied());
        assert_eq!(state.round_results()[0].guesses_used, 0);
    }

    #[test]
    fn test_pre_game_state_roundtrip() {
        let json = serde_json::to_string(&GameState::new()).unwrap();
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, GameState::new());
        assert!(restored.validate().is_ok());
    }
}
