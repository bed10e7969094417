//! WebAssembly bindings for the Country Quiz engine
//!
//! The page owns the UI; this crate owns the game. Every player action goes
//! through [`QuizGame`], which applies it to the state machine, records any
//! resolved round in `localStorage` and hands a JSON snapshot back for
//! rendering.

use quiz_core::{
    build_catalog, game_share_text, geojson_filename, outline_map_url, parse_raw_countries,
    random_country, round_share_text, stats_share_text, Action, CatalogCache, CatalogSource,
    ClueType, Clock, Country, Difficulty, GameState, GeoJsonCache, JsonCatalogSource,
    JsonGeoJsonSource, KeyValue, KvQuizStore, MemoryKv, QuizConfig, RecordOutcome,
    SettingsPatch, SettingsService, ShareLink, StatsManager, Theme, Transition,
};
use serde::Serialize;
use std::fmt::Display;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

mod storage;


pub use storage::{JsClock, LocalStorageKv};

// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Plain JS objects rather than `Map`s, so GeoJSON properties read naturally
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_err)
}

/// The main WASM game controller
#[wasm_bindgen]
pub struct QuizGame {
    state: GameState,
    catalog: Arc<Vec<Country>>,
    stats: StatsManager,
    settings: SettingsService,
    outlines: Option<GeoJsonCache>,
    config: QuizConfig,
}

#[wasm_bindgen]
impl QuizGame {
    /// Create a game over the bundled catalog, persisting to `localStorage`
    /// when the browser allows it and to memory otherwise
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<QuizGame, JsValue> {
        let config = QuizConfig::default();
        let kv: Arc<dyn KeyValue> = if LocalStorageKv.is_available() {
            Arc::new(LocalStorageKv)
        } else {
            web_sys::console::warn_1(&"localStorage unavailable, progress will not be kept".into());
            Arc::new(MemoryKv::new())
        };
        let clock: Arc<dyn Clock> = Arc::new(JsClock);

        let source: Arc<dyn CatalogSource> = Arc::new(JsonCatalogSource::bundled());
        let catalog = CatalogCache::new(source, Arc::clone(&kv), &config)
            .load(clock.now_ms())
            .map_err(js_err)?;

        let user_id = quiz_core::user_id(kv.as_ref());
        let store = Arc::new(KvQuizStore::from_config(kv, &config));

        Ok(QuizGame {
            state: GameState::new(),
            catalog,
            stats: StatsManager::new(store.clone(), clock.clone(), user_id.clone()),
            settings: SettingsService::new(store, clock, user_id),
            outlines: None,
            config,
        })
    }

    /// Replace the catalog with raw country records; returns the playable count
    #[wasm_bindgen]
    pub fn load_catalog_json(&mut self, json: &str) -> Result<usize, JsValue> {
        let raws = parse_raw_countries(json).map_err(js_err)?;
        self.catalog = Arc::new(build_catalog(&raws));
        Ok(self.catalog.len())
    }

    /// Number of countries in the catalog
    #[wasm_bindgen]
    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    /// Start a game. A missing or zero seed picks a random one; the seed in play is returned.
    #[wasm_bindgen]
    pub fn start_new_game(&mut self, difficulty: &str, seed: Option<f64>) -> Result<f64, JsValue> {
        let difficulty: Difficulty = difficulty.parse().map_err(js_err)?;
        let seed = seed
            .filter(|s| s.is_finite() && *s >= 1.0)
            .map(|s| s as u64);
        let seed = self
            .state
            .start_new_game(&self.catalog, difficulty, seed)
            .map_err(js_err)?;
        Ok(seed as f64)
    }

    /// Start the game described by a share link or its query string
    #[wasm_bindgen]
    pub fn start_from_share(&mut self, link: &str) -> Result<f64, JsValue> {
        let link = ShareLink::parse(link).map_err(js_err)?;
        let seed = self
            .state
            .start_new_game(&self.catalog, link.difficulty, Some(link.seed))
            .map_err(js_err)?;
        Ok(seed as f64)
    }

    /// Reveal a clue by name; false if it was ignored
    #[wasm_bindgen]
    pub fn reveal_clue(&mut self, clue: &str) -> Result<bool, JsValue> {
        let clue: ClueType = clue.parse().map_err(js_err)?;
        Ok(self.apply(Action::RevealClue(clue)))
    }

    #[wasm_bindgen]
    pub fn make_guess(&mut self, guess: &str) -> bool {
        self.apply(Action::MakeGuess(guess.to_string()))
    }

    #[wasm_bindgen]
    pub fn give_up(&mut self) -> bool {
        self.apply(Action::GiveUp)
    }

    #[wasm_bindgen]
    pub fn next_round(&mut self) -> bool {
        self.apply(Action::NextRound)
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.apply(Action::ResetGame);
    }

    fn apply(&mut self, action: Action) -> bool {
        let transition = self.state.apply(action);
        self.record_events();
        transition == Transition::Applied
    }

    /// Resolved rounds go straight to the store; failures never block the game
    fn record_events(&mut self) {
        for outcome in self.stats.process_events(self.state.drain_events()) {
            if !outcome.is_recorded() {
                let message = match outcome {
                    RecordOutcome::StatisticNotSaved(e) => format!("statistic not saved: {e}"),
                    RecordOutcome::AchievementsNotSaved(e) => format!("achievements not saved: {e}"),
                    RecordOutcome::Recorded(_) => continue,
                };
                web_sys::console::warn_1(&message.into());
            }
        }
    }

    /// Current game state as a JS object
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state)
    }

    /// Get current game state as JSON
    #[wasm_bindgen]
    pub fn get_state_json(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_default()
    }

    /// Load game state from JSON
    #[wasm_bindgen]
    pub fn load_state_json(&mut self, json: &str) -> bool {
        match serde_json::from_str(json) {
            Ok(state) => {
                self.state = state;
                true
            }
            Err(_) => false,
        }
    }

    #[wasm_bindgen]
    pub fn status(&self) -> String {
        match self.state.status() {
            quiz_core::RoundStatus::Playing => "playing",
            quiz_core::RoundStatus::Won => "won",
            quiz_core::RoundStatus::Lost => "lost",
        }
        .to_string()
    }

    #[wasm_bindgen]
    pub fn round_number(&self) -> usize {
        self.state.round_number()
    }

    #[wasm_bindgen]
    pub fn playable_rounds(&self) -> usize {
        self.state.playable_rounds()
    }

    #[wasm_bindgen]
    pub fn guesses_remaining(&self) -> u32 {
        self.state.guesses_remaining()
    }

    #[wasm_bindgen]
    pub fn score(&self) -> u32 {
        self.state.score()
    }

    #[wasm_bindgen]
    pub fn total_score(&self) -> u32 {
        self.state.total_score()
    }

    #[wasm_bindgen]
    pub fn is_game_complete(&self) -> bool {
        self.state.is_game_complete()
    }

    /// Get current difficulty
    #[wasm_bindgen]
    pub fn difficulty(&self) -> String {
        self.state.difficulty().to_string()
    }

    /// `?seed=<n>&difficulty=<tier>` for the game in play
    #[wasm_bindgen]
    pub fn share_query(&self) -> Option<String> {
        ShareLink::for_game(&self.state).map(|link| link.to_query())
    }

    #[wasm_bindgen]
    pub fn share_url(&self, base_url: &str) -> Option<String> {
        ShareLink::for_game(&self.state).map(|link| link.url(base_url))
    }

    #[wasm_bindgen]
    pub fn game_share_text(&self, base_url: &str) -> String {
        game_share_text(&self.state, base_url)
    }

    #[wasm_bindgen]
    pub fn round_share_text(&self) -> String {
        round_share_text(&self.state)
    }

    #[wasm_bindgen]
    pub fn stats_share_text(&self) -> String {
        stats_share_text(self.stats.get_or_create().ok().as_ref())
    }

    /// Lifetime achievements
    #[wasm_bindgen]
    pub fn achievements(&self) -> Result<JsValue, JsValue> {
        let achievements = self.stats.get_or_create().map_err(js_err)?;
        to_js(&achievements)
    }

    /// Most recent game statistics, newest first; defaults to the configured limit
    #[wasm_bindgen]
    pub fn recent_games(&self, limit: Option<usize>) -> Result<JsValue, JsValue> {
        let games = self
            .stats
            .recent_games(limit.unwrap_or(self.config.recent_games_limit));
        to_js(&games)
    }

    #[wasm_bindgen]
    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.settings.get_or_create())
    }

    /// Apply a partial settings object; returns the stored settings
    #[wasm_bindgen]
    pub fn update_settings(&self, patch: JsValue) -> Result<JsValue, JsValue> {
        let patch: SettingsPatch = serde_wasm_bindgen::from_value(patch).map_err(js_err)?;
        let updated = self
            .settings
            .update(&patch)
            .ok_or_else(|| js_err("settings could not be saved"))?;
        to_js(&updated)
    }

    #[wasm_bindgen]
    pub fn set_theme(&self, theme: &str) -> Result<bool, JsValue> {
        let theme: Theme = theme.parse().map_err(js_err)?;
        Ok(self.settings.update_theme(theme).is_some())
    }

    #[wasm_bindgen]
    pub fn dismiss_welcome(&self) -> bool {
        self.settings.dismiss_welcome().is_some()
    }

    /// Install the outline collection used by the map clue
    #[wasm_bindgen]
    pub fn load_outlines_json(&mut self, json: &str) -> Result<usize, JsValue> {
        let cache = GeoJsonCache::new(Arc::new(JsonGeoJsonSource::Inline(json.to_string())));
        let count = cache.load().map_err(js_err)?.features.len();
        self.outlines = Some(cache);
        Ok(count)
    }

    /// GeoJSON feature for the current country, `null` when none matches
    #[wasm_bindgen]
    pub fn current_outline(&self) -> Result<JsValue, JsValue> {
        let (Some(country), Some(outlines)) = (self.state.current_country(), &self.outlines) else {
            return Ok(JsValue::NULL);
        };
        match outlines.feature_for_code3(&country.code3).map_err(js_err)? {
            Some(feature) => to_js(&feature),
            None => Ok(JsValue::NULL),
        }
    }

    /// Per-country outline file name for the current country
    #[wasm_bindgen]
    pub fn current_outline_file(&self) -> Option<String> {
        self.state
            .current_country()
            .map(|c| format!("{}.geojson", geojson_filename(&c.name)))
    }

    /// Static outline image URL for the current country
    #[wasm_bindgen]
    pub fn current_outline_map_url(&self) -> Option<String> {
        self.state
            .current_country()
            .map(|c| outline_map_url(&c.code))
    }

    /// A random catalog entry, for the landing page teaser
    #[wasm_bindgen]
    pub fn random_country(&self) -> Result<JsValue, JsValue> {
        match random_country(&self.catalog) {
            Some(country) => to_js(country),
            None => Ok(JsValue::NULL),
        }
    }
}
