//! Statistics aggregation
//!
//! Every resolved round becomes one [`GameStatistic`] record and, once that
//! record is stored, an update of the player's [`UserAchievements`]. Failures
//! are logged and reported to the caller as a [`RecordOutcome`]; they never
//! reach back into the game.

use crate::clock::Clock;
use crate::country::ClueType;
use crate::difficulty::Difficulty;
use crate::error::{StoreError, StoreResult};
use crate::game::{GameEvent, RoundResolved};
use crate::identity::new_id;
use crate::store::QuizStore;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

/// Most clues a win may use and still count as perfect
pub const PERFECT_MAX_CLUES: usize = 2;

/// A won round with at most two clues on the first guess
pub fn is_perfect_game(won: bool, clues_used: usize, guesses_made: u32) -> bool {
    won && clues_used <= PERFECT_MAX_CLUES && guesses_made == 1
}

/// Aggregate record per player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievements {
    pub user_id: String,
    pub total_games: u32,
    pub total_wins: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub perfect_games: u32,
    pub easy_wins: u32,
    pub medium_wins: u32,
    pub hard_wins: u32,
    pub total_clues_used: u32,
    /// Unix milliseconds
    pub created_at: u64,
    pub updated_at: u64,
}

impl UserAchievements {
    pub fn new(user_id: &str, now_ms: u64) -> Self {
        Self {
            user_id: user_id.to_string(),
            total_games: 0,
            total_wins: 0,
            current_streak: 0,
            best_streak: 0,
            perfect_games: 0,
            easy_wins: 0,
            medium_wins: 0,
            hard_wins: 0,
            total_clues_used: 0,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Fold one resolved round into the totals
    pub fn apply_resolution(&mut self, round: &RoundResolved, now_ms: u64) {
        self.total_games += 1;
        self.total_clues_used += round.clues_used as u32;

        if round.won {
            self.total_wins += 1;
            self.current_streak += 1;
            self.best_streak = self.best_streak.max(self.current_streak);
            match round.difficulty {
                Difficulty::Easy => self.easy_wins += 1,
                Difficulty::Medium => self.medium_wins += 1,
                Difficulty::Hard => self.hard_wins += 1,
            }
        } else {
            self.current_streak = 0;
        }

        if is_perfect_game(round.won, round.clues_used, round.guesses_made) {
            self.perfect_games += 1;
        }

        self.updated_at = now_ms;
    }

    /// Win percentage, 0 when nothing has been played
    pub fn win_rate(&self) -> f64 {
        if self.total_games > 0 {
            self.total_wins as f64 / self.total_games as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Average clues revealed per round, 0 when nothing has been played
    pub fn avg_clues(&self) -> f64 {
        if self.total_games > 0 {
            self.total_clues_used as f64 / self.total_games as f64
        } else {
            0.0
        }
    }

    pub fn wins_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy_wins,
            Difficulty::Medium => self.medium_wins,
            Difficulty::Hard => self.hard_wins,
        }
    }
}

/// One persisted record per resolved round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistic {
    pub id: String,
    pub user_id: String,
    pub country_name: String,
    pub difficulty: Difficulty,
    pub clues_used: usize,
    pub guesses_made: u32,
    pub won: bool,
    pub score: u32,
    /// Clue kinds in reveal order
    pub clues_revealed: Vec<ClueType>,
    /// Unix milliseconds
    pub played_at: u64,
}

impl GameStatistic {
    pub fn from_resolution(user_id: &str, round: &RoundResolved, now_ms: u64) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            country_name: round.country_name.clone(),
            difficulty: round.difficulty,
            clues_used: round.clues_used,
            guesses_made: round.guesses_made,
            won: round.won,
            score: round.score,
            clues_revealed: round.clues_revealed.clone(),
            played_at: now_ms,
        }
    }
}

/// What happened to a resolved round on its way to the store
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    /// Statistic stored and achievements updated
    Recorded(UserAchievements),
    /// The statistic insert failed, achievements were left alone
    StatisticNotSaved(StoreError),
    /// The statistic is stored but the achievements update failed
    AchievementsNotSaved(StoreError),
}

impl RecordOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, RecordOutcome::Recorded(_))
    }
}

/// Records resolved rounds for one player
pub struct StatsManager {
    store: Arc<dyn QuizStore>,
    clock: Arc<dyn Clock>,
    user_id: String,
    /// Held across every read-modify-write of the achievements record
    achievements_lock: Mutex<()>,
}

impl std::fmt::Debug for StatsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsManager")
            .field("store", &self.store.backend_name())
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl StatsManager {
    pub fn new(store: Arc<dyn QuizStore>, clock: Arc<dyn Clock>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            user_id: user_id.into(),
            achievements_lock: Mutex::new(()),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The player's achievements, created empty on first use
    pub fn get_or_create(&self) -> StoreResult<UserAchievements> {
        let _guard = self.lock_achievements();
        self.get_or_create_locked()
    }

    fn lock_achievements(&self) -> MutexGuard<'_, ()> {
        self.achievements_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get_or_create_locked(&self) -> StoreResult<UserAchievements> {
        if let Some(existing) = self.store.get_achievements(&self.user_id)? {
            return Ok(existing);
        }
        tracing::debug!(user_id = %self.user_id, "creating achievements record");
        self.store
            .insert_achievements(UserAchievements::new(&self.user_id, self.clock.now_ms()))
    }

    /// Store a resolved round, then fold it into the achievements
    pub fn record_resolution(&self, round: &RoundResolved) -> RecordOutcome {
        let now = self.clock.now_ms();
        let statistic = GameStatistic::from_resolution(&self.user_id, round, now);

        if let Err(e) = self.store.insert_statistic(statistic) {
            tracing::warn!(error = %e, country = %round.country_name, "failed to save game statistic");
            return RecordOutcome::StatisticNotSaved(e);
        }

        let _guard = self.lock_achievements();
        let result = self.get_or_create_locked().and_then(|mut achievements| {
            achievements.apply_resolution(round, now);
            self.store.update_achievements(&achievements)?;
            Ok(achievements)
        });

        match result {
            Ok(achievements) => {
                tracing::debug!(
                    total_games = achievements.total_games,
                    current_streak = achievements.current_streak,
                    "recorded round"
                );
                RecordOutcome::Recorded(achievements)
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to update achievements");
                RecordOutcome::AchievementsNotSaved(e)
            }
        }
    }

    /// Record every event drained from a game, in order
    pub fn process_events(&self, events: Vec<GameEvent>) -> Vec<RecordOutcome> {
        events
            .into_iter()
            .map(|event| match event {
                GameEvent::RoundResolved(round) => self.record_resolution(&round),
            })
            .collect()
    }

    /// Most recent rounds first; empty if the store cannot be read
    pub fn recent_games(&self, limit: usize) -> Vec<GameStatistic> {
        self.store
            .recent_statistics(&self.user_id, limit)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to load recent games");
                Vec::new()
            })
    }
}

#[cfg(not(target_arch = "wasm32"))]
enum RecorderMessage {
    Event(GameEvent),
    Flush(std::sync::mpsc::Sender<()>),
}

/// Records game events on a background thread so the game loop never waits
/// on the store.
#[cfg(not(target_arch = "wasm32"))]
pub struct StatsRecorder {
    sender: Option<std::sync::mpsc::Sender<RecorderMessage>>,
    worker: Option<std::thread::JoinHandle<()>>,
}

#[cfg(not(target_arch = "wasm32"))]
impl StatsRecorder {
    pub fn spawn(manager: Arc<StatsManager>) -> std::io::Result<Self> {
        let (sender, receiver) = std::sync::mpsc::channel::<RecorderMessage>();
        let worker = std::thread::Builder::new()
            .name("stats-recorder".into())
            .spawn(move || {
                for message in receiver {
                    match message {
                        RecorderMessage::Event(event) => {
                            manager.process_events(vec![event]);
                        }
                        RecorderMessage::Flush(done) => {
                            let _ = done.send(());
                        }
                    }
                }
            })?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Queue events for recording
    pub fn send(&self, events: Vec<GameEvent>) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        for event in events {
            if sender.send(RecorderMessage::Event(event)).is_err() {
                tracing::warn!("stats recorder has stopped, dropping event");
                return;
            }
        }
    }

    /// Block until everything queued so far has been recorded
    pub fn flush(&self) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        let (done, wait) = std::sync::mpsc::channel();
        if sender.send(RecorderMessage::Flush(done)).is_ok() {
            let _ = wait.recv();
        }
    }

    /// Wait for queued events to be recorded and stop the thread
    pub fn shutdown(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("stats recorder thread panicked");
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for StatsRecorder {
    fn drop(&mut self) {
        self.finish();
    }
}
