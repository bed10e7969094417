use crate::palette::Palette;
use quiz_core::{
    game_share_text, round_share_text, stats_share_text, Action, ClueType, Clock, Country,
    Difficulty, GameSeed, GameState, GameStatistic, IgnoredReason, QuizConfig, QuizResult,
    QuizStore, RoundStatus, SettingsService, StatsManager, StatsRecorder, Theme, Transition,
    UserAchievements,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

/// Saved-game file inside the data directory
pub const SAVE_FILE_NAME: &str = "country_quiz_save.json";

/// Base URL used in share texts
pub const SHARE_BASE_URL: &str = "https://country-quiz.app/";

/// Result of handling a command
pub enum AppAction {
    Continue,
    Quit,
}

/// What the main area shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    Stats,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// Status line under the main area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub tone: Tone,
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Clue(ClueType),
    Guess(String),
    GiveUp,
    Next,
    New(Option<Difficulty>),
    Stats,
    Share,
    Theme(Theme),
    Save,
    Load,
    Help,
    Quit,
}

/// Commands shown on the help screen
pub const HELP: &[(&str, &str)] = &[
    ("clue <kind>", "reveal flag, map, capital, export, fact or region"),
    ("guess <name>", "guess the country (plain text works too)"),
    ("give up", "reveal the answer and end the round"),
    ("next", "move to the next round"),
    ("new [difficulty]", "start a new game"),
    ("stats", "show your statistics"),
    ("share", "print a shareable summary"),
    ("theme <light|dark|system>", "change colors"),
    ("save / load", "keep the current game for later"),
    ("help", "show this screen"),
    ("quit", "leave the game"),
];

/// Parse one input line. Text that is not a command counts as a guess.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    if line.is_empty() {
        return Err("Type a command, or 'help'".to_string());
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_lowercase().as_str() {
        "clue" | "c" => Command::Clue(rest.parse().map_err(|e: quiz_core::QuizError| e.to_string())?),
        "guess" | "g" => {
            if rest.is_empty() {
                return Err("Guess which country?".to_string());
            }
            Command::Guess(rest.to_string())
        }
        "give" if rest.eq_ignore_ascii_case("up") => Command::GiveUp,
        "giveup" | "skip" => Command::GiveUp,
        "next" | "n" => Command::Next,
        "new" if rest.is_empty() => Command::New(None),
        // "new zealand" is a guess, not a difficulty
        "new" => match rest.parse() {
            Ok(difficulty) => Command::New(Some(difficulty)),
            Err(_) => Command::Guess(line.to_string()),
        },
        "stats" => Command::Stats,
        "share" => Command::Share,
        "theme" => Command::Theme(rest.parse().map_err(|e: quiz_core::QuizError| e.to_string())?),
        "save" => Command::Save,
        "load" => Command::Load,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        _ => Command::Guess(line.to_string()),
    };
    Ok(command)
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedGame {
    saved_at: u64,
    state: GameState,
}

/// Everything the app needs from the outside world
pub struct AppContext {
    pub config: QuizConfig,
    pub catalog: Arc<Vec<Country>>,
    pub store: Arc<dyn QuizStore>,
    pub clock: Arc<dyn Clock>,
    pub user_id: String,
}

/// The terminal application state
pub struct App {
    pub game: GameState,
    pub screen: Screen,
    pub palette: Palette,
    pub message: Option<Message>,
    catalog: Arc<Vec<Country>>,
    stats: Arc<StatsManager>,
    settings: SettingsService,
    recorder: StatsRecorder,
    clock: Arc<dyn Clock>,
    config: QuizConfig,
}

impl App {
    pub fn new(ctx: AppContext) -> io::Result<Self> {
        let stats = Arc::new(StatsManager::new(
            ctx.store.clone(),
            ctx.clock.clone(),
            ctx.user_id.clone(),
        ));
        let settings = SettingsService::new(ctx.store, ctx.clock.clone(), ctx.user_id);
        let palette = Palette::for_theme(settings.get_or_create().theme_preference);
        let recorder = StatsRecorder::spawn(Arc::clone(&stats))?;

        Ok(Self {
            game: GameState::new(),
            screen: Screen::Playing,
            palette,
            message: None,
            catalog: ctx.catalog,
            stats,
            settings,
            recorder,
            clock: ctx.clock,
            config: ctx.config,
        })
    }

    /// Difficulty from the stored settings
    pub fn preferred_difficulty(&self) -> Difficulty {
        self.settings.get_or_create().preferred_difficulty
    }

    /// Start a game; the effective seed is returned for the share link
    pub fn start(&mut self, difficulty: Difficulty, seed: Option<GameSeed>) -> QuizResult<GameSeed> {
        let seed = self.game.start_new_game(&self.catalog, difficulty, seed)?;
        self.screen = Screen::Playing;
        self.show(
            Tone::Info,
            format!(
                "New {} game, seed {}. Type 'help' for commands.",
                difficulty, seed
            ),
        );
        Ok(seed)
    }

    pub fn show(&mut self, tone: Tone, text: impl Into<String>) {
        self.message = Some(Message {
            text: text.into(),
            tone,
        });
    }

    /// Parse and run one input line
    pub fn handle_line(&mut self, line: &str) -> AppAction {
        match parse_command(line) {
            Ok(command) => self.handle_command(command),
            Err(e) => {
                self.show(Tone::Error, e);
                AppAction::Continue
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> AppAction {
        self.message = None;
        if !matches!(command, Command::Stats | Command::Help) {
            self.screen = Screen::Playing;
        }

        match command {
            Command::Clue(clue) => {
                let transition = self.game.apply(Action::RevealClue(clue));
                self.report_ignored(transition);
            }
            Command::Guess(guess) => self.guess(guess),
            Command::GiveUp => {
                let transition = self.game.apply(Action::GiveUp);
                if transition.is_applied() {
                    let answer = self.answer();
                    self.show(Tone::Error, format!("The answer was {answer}."));
                } else {
                    self.report_ignored(transition);
                }
            }
            Command::Next => self.next_round(),
            Command::New(difficulty) => {
                let difficulty = match difficulty {
                    Some(d) => {
                        self.settings.update_preferred_difficulty(d);
                        d
                    }
                    None => self.game.difficulty(),
                };
                if let Err(e) = self.start(difficulty, None) {
                    self.show(Tone::Error, e.to_string());
                }
            }
            Command::Stats => {
                self.recorder.flush();
                self.screen = Screen::Stats;
            }
            Command::Share => {
                self.recorder.flush();
                let text = if self.game.is_game_complete() {
                    game_share_text(&self.game, SHARE_BASE_URL)
                } else if self.game.status().is_resolved() {
                    round_share_text(&self.game)
                } else {
                    stats_share_text(self.achievements().as_ref())
                };
                self.show(Tone::Info, text);
            }
            Command::Theme(theme) => {
                self.palette = Palette::for_theme(theme);
                if self.settings.update_theme(theme).is_some() {
                    self.show(Tone::Success, format!("Theme set to {theme}."));
                } else {
                    self.show(Tone::Error, "Theme applied but could not be saved.");
                }
            }
            Command::Save => self.save_game(),
            Command::Load => self.load_game(),
            Command::Help => self.screen = Screen::Help,
            Command::Quit => return AppAction::Quit,
        }

        self.recorder.send(self.game.drain_events());
        AppAction::Continue
    }

    fn guess(&mut self, guess: String) {
        let transition = self.game.apply(Action::MakeGuess(guess));
        if !transition.is_applied() {
            self.report_ignored(transition);
            return;
        }

        match self.game.status() {
            RoundStatus::Won => {
                let score = self.game.score();
                self.show(Tone::Success, format!("Correct! +{score} points."));
            }
            RoundStatus::Lost => {
                let answer = self.answer();
                self.show(Tone::Error, format!("Out of guesses! It was {answer}."));
            }
            RoundStatus::Playing => {
                let left = self.game.guesses_remaining();
                let plural = if left == 1 { "guess" } else { "guesses" };
                self.show(Tone::Error, format!("Not quite. {left} {plural} left."));
            }
        }
    }

    fn next_round(&mut self) {
        match self.game.apply(Action::NextRound) {
            Transition::Applied => {
                let text = format!(
                    "Round {} of {}.",
                    self.game.round_number(),
                    self.game.playable_rounds()
                );
                self.show(Tone::Info, text);
            }
            Transition::Ignored(_) if self.game.is_game_complete() => {
                let total = self.game.total_score();
                self.show(
                    Tone::Success,
                    format!("Game over! Final score {total}. Type 'share' or 'new'."),
                );
            }
            Transition::Ignored(_) => {
                self.show(Tone::Info, "This is the last round. Finish it first.")
            }
        }
    }

    fn report_ignored(&mut self, transition: Transition) {
        let text = match transition {
            Transition::Applied => return,
            Transition::Ignored(IgnoredReason::RoundOver) => "This round is over. Type 'next'.",
            Transition::Ignored(IgnoredReason::AlreadyRevealed) => "That clue is already showing.",
            Transition::Ignored(IgnoredReason::NoCurrentCountry) => "Start a game with 'new'.",
            Transition::Ignored(IgnoredReason::NoMoreRounds) => "No more rounds.",
        };
        self.show(Tone::Info, text);
    }

    fn answer(&self) -> String {
        self.game
            .current_country()
            .map(|c| c.name.clone())
            .unwrap_or_default()
    }

    /// Achievements for the stats screen, `None` if the store is unreadable
    pub fn achievements(&self) -> Option<UserAchievements> {
        self.stats
            .get_or_create()
            .map_err(|e| tracing::warn!(error = %e, "failed to load achievements"))
            .ok()
    }

    pub fn recent_games(&self) -> Vec<GameStatistic> {
        self.stats.recent_games(self.config.recent_games_limit)
    }

    fn save_path(&self) -> PathBuf {
        self.config.resolved_data_dir().join(SAVE_FILE_NAME)
    }

    fn save_game(&mut self) {
        let saved = SavedGame {
            saved_at: self.clock.now_ms(),
            state: self.game.clone(),
        };
        let path = self.save_path();
        let result = serde_json::to_string_pretty(&saved)
            .map_err(io::Error::other)
            .and_then(|json| {
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir)?;
                }
                fs::write(&path, json)
            });
        match result {
            Ok(()) => self.show(Tone::Success, "Game saved."),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to save game");
                self.show(Tone::Error, "Failed to save.");
            }
        }
    }

    fn load_game(&mut self) {
        let json = match fs::read_to_string(self.save_path()) {
            Ok(json) => json,
            Err(_) => {
                self.show(Tone::Error, "No saved game found.");
                return;
            }
        };
        match serde_json::from_str::<SavedGame>(&json) {
            Ok(saved) => {
                self.game = saved.state;
                self.show(Tone::Success, "Game loaded.");
            }
            Err(e) => {
                tracing::warn!(error = %e, "saved game is invalid");
                self.show(Tone::Error, "Invalid save file.");
            }
        }
    }

    /// Record anything still queued before exit
    pub fn shutdown(self) {
        self.recorder.shutdown();
    }
}
