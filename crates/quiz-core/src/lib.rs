//! Country Quiz engine
//!
//! Deterministic round generation, scoring and game progression for a
//! geography guessing game, plus the statistics, settings and catalog layers
//! the game hosts share.
//!
//! A game is reproducible from its seed and difficulty: anyone opening the
//! same share link against the same catalog plays the same five countries.
//!
//! ```no_run
//! use quiz_core::{build_catalog, Action, Difficulty, GameState, JsonCatalogSource, CatalogSource};
//!
//! let raws = JsonCatalogSource::bundled().fetch().unwrap();
//! let catalog = build_catalog(&raws);
//!
//! let mut game = GameState::new();
//! game.start_new_game(&catalog, Difficulty::Easy, Some(42)).unwrap();
//! game.apply(Action::MakeGuess("China".into()));
//! ```

pub mod catalog;
pub mod clock;
pub mod config;
pub mod country;
pub mod difficulty;
pub mod error;
pub mod game;
pub mod geo;
pub mod identity;
pub mod rng;
pub mod scoring;
pub mod selector;
pub mod settings;
pub mod share;
pub mod stats;
pub mod store;

#[cfg(test)]
mod test_logging;

pub use catalog::{
    build_catalog, parse_raw_countries, random_country, CatalogCache, CatalogSource,
    JsonCatalogSource, RawCountry,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Environment, QuizConfig};
pub use country::{ClueType, Country};
pub use difficulty::{partition, Difficulty};
pub use error::{QuizError, QuizResult, StoreError, StoreResult};
pub use game::{
    reduce, Action, GameEvent, GameState, IgnoredReason, RoundResolved, RoundResult, RoundStatus,
    Transition, TOTAL_ROUNDS,
};
pub use geo::{
    geojson_filename, outline_map_url, GeoJsonCache, GeoJsonCollection, GeoJsonFeature,
    GeoJsonSource, JsonGeoJsonSource,
};
pub use identity::user_id;
pub use rng::{generate_seed, GameSeed, SeededRandom};
pub use scoring::{score, MAX_GUESSES};
pub use selector::select_rounds;
pub use settings::{SettingsPatch, SettingsService, Theme, UserSettings};
pub use share::{game_share_text, round_share_text, stats_share_text, ShareLink};
pub use stats::{GameStatistic, RecordOutcome, StatsManager, UserAchievements};
#[cfg(not(target_arch = "wasm32"))]
pub use stats::StatsRecorder;
pub use store::{create_key_value, FileKv, KeyValue, KvQuizStore, MemoryKv, QuizStore};
