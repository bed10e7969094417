//! Persistence backends
//!
//! Two layers:
//! - [`KeyValue`]: raw string storage (file, memory, browser `localStorage`)
//! - [`QuizStore`]: typed settings, achievements and statistics records keyed
//!   by user id, implemented once over any [`KeyValue`] by [`KvQuizStore`]

use crate::config::{Environment, QuizConfig};
use crate::error::{StoreError, StoreResult};
use crate::settings::{SettingsPatch, UserSettings};
use crate::stats::{GameStatistic, UserAchievements};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock a mutex, recovering the data if a previous holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Raw string key-value storage
pub trait KeyValue: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Check if backend is reachable
    fn is_available(&self) -> bool;

    /// Get backend name for display
    fn backend_name(&self) -> &'static str;
}

// ==================== File Backend ====================

/// All keys in one JSON object on disk
pub struct FileKv {
    path: PathBuf,
    cache: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileKv {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn load(&self, cache: &mut Option<BTreeMap<String, String>>) -> StoreResult<BTreeMap<String, String>> {
        if let Some(ref data) = *cache {
            return Ok(data.clone());
        }

        let data = match std::fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "store file is corrupt, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        *cache = Some(data.clone());
        Ok(data)
    }

    fn save(&self, cache: &mut Option<BTreeMap<String, String>>, data: BTreeMap<String, String>) -> StoreResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(&data)?;
        std::fs::write(&self.path, json)?;
        *cache = Some(data);
        Ok(())
    }
}

impl KeyValue for FileKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut cache = lock(&self.cache);
        Ok(self.load(&mut cache)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut cache = lock(&self.cache);
        let mut data = self.load(&mut cache)?;
        data.insert(key.to_string(), value.to_string());
        self.save(&mut cache, data)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut cache = lock(&self.cache);
        let mut data = self.load(&mut cache)?;
        if data.remove(key).is_some() {
            self.save(&mut cache, data)?;
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "File"
    }
}

// ==================== Memory Backend ====================

/// In-memory storage for tests and throwaway sessions
pub struct MemoryKv {
    data: Mutex<HashMap<String, String>>,
    available: Mutex<bool>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(HashMap::new()),
            available: Mutex::new(true),
        }
    }

    /// Set whether the backend should report as available.
    ///
    /// An unavailable backend fails every operation.
    pub fn set_available(&self, available: bool) {
        *lock(&self.available) = available;
    }

    /// Clear all entries
    pub fn clear(&self) {
        lock(&self.data).clear();
    }

    /// Get entry count
    pub fn count(&self) -> usize {
        lock(&self.data).len()
    }

    fn check(&self) -> StoreResult<()> {
        if *lock(&self.available) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store disabled".into()))
        }
    }
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValue for MemoryKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check()?;
        Ok(lock(&self.data).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check()?;
        lock(&self.data).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check()?;
        lock(&self.data).remove(key);
        Ok(())
    }

    fn is_available(&self) -> bool {
        *lock(&self.available)
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

/// Create the raw backend for the configured environment
pub fn create_key_value(config: &QuizConfig) -> Arc<dyn KeyValue> {
    match config.environment {
        Environment::Local => Arc::new(FileKv::new(config.store_path())),
        Environment::Test => Arc::new(MemoryKv::new()),
    }
}

// ==================== Typed Records ====================

/// Settings, achievements and game statistics, keyed by user id
pub trait QuizStore: Send + Sync {
    fn get_settings(&self, user_id: &str) -> StoreResult<Option<UserSettings>>;

    /// Insert if absent; returns the stored record, which is the existing one
    /// when another writer got there first
    fn insert_settings(&self, settings: UserSettings) -> StoreResult<UserSettings>;

    /// Apply a patch to an existing record
    fn update_settings(
        &self,
        user_id: &str,
        patch: &SettingsPatch,
        now_ms: u64,
    ) -> StoreResult<UserSettings>;

    fn get_achievements(&self, user_id: &str) -> StoreResult<Option<UserAchievements>>;

    /// Insert if absent; returns the stored record
    fn insert_achievements(&self, achievements: UserAchievements) -> StoreResult<UserAchievements>;

    /// Replace an existing record
    fn update_achievements(&self, achievements: &UserAchievements) -> StoreResult<()>;

    /// Append one resolved-round record
    fn insert_statistic(&self, statistic: GameStatistic) -> StoreResult<()>;

    /// Most recent records first, at most `limit`
    fn recent_statistics(&self, user_id: &str, limit: usize) -> StoreResult<Vec<GameStatistic>>;

    fn is_available(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

/// [`QuizStore`] stored as JSON documents in a [`KeyValue`] backend
pub struct KvQuizStore {
    kv: Arc<dyn KeyValue>,
    history_limit: usize,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl KvQuizStore {
    pub fn new(kv: Arc<dyn KeyValue>, history_limit: usize) -> Self {
        Self {
            kv,
            history_limit,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(kv: Arc<dyn KeyValue>, config: &QuizConfig) -> Self {
        Self::new(kv, config.history_limit)
    }

    fn settings_key(user_id: &str) -> String {
        format!("settings/{user_id}")
    }

    fn achievements_key(user_id: &str) -> String {
        format!("achievements/{user_id}")
    }

    fn statistics_key(user_id: &str) -> String {
        format!("statistics/{user_id}")
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.kv.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.kv.set(key, &json)
    }
}

impl QuizStore for KvQuizStore {
    fn get_settings(&self, user_id: &str) -> StoreResult<Option<UserSettings>> {
        self.read(&Self::settings_key(user_id))
    }

    fn insert_settings(&self, settings: UserSettings) -> StoreResult<UserSettings> {
        let _guard = lock(&self.write_lock);
        let key = Self::settings_key(&settings.id);
        if let Some(existing) = self.read(&key)? {
            return Ok(existing);
        }
        self.write(&key, &settings)?;
        Ok(settings)
    }

    fn update_settings(
        &self,
        user_id: &str,
        patch: &SettingsPatch,
        now_ms: u64,
    ) -> StoreResult<UserSettings> {
        let _guard = lock(&self.write_lock);
        let key = Self::settings_key(user_id);
        let mut settings: UserSettings = self
            .read(&key)?
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        settings.apply_patch(patch, now_ms);
        self.write(&key, &settings)?;
        Ok(settings)
    }

    fn get_achievements(&self, user_id: &str) -> StoreResult<Option<UserAchievements>> {
        self.read(&Self::achievements_key(user_id))
    }

    fn insert_achievements(&self, achievements: UserAchievements) -> StoreResult<UserAchievements> {
        let _guard = lock(&self.write_lock);
        let key = Self::achievements_key(&achievements.user_id);
        if let Some(existing) = self.read(&key)? {
            return Ok(existing);
        }
        self.write(&key, &achievements)?;
        Ok(achievements)
    }

    fn update_achievements(&self, achievements: &UserAchievements) -> StoreResult<()> {
        let _guard = lock(&self.write_lock);
        let key = Self::achievements_key(&achievements.user_id);
        if self.kv.get(&key)?.is_none() {
            return Err(StoreError::NotFound(key));
        }
        self.write(&key, achievements)
    }

    fn insert_statistic(&self, statistic: GameStatistic) -> StoreResult<()> {
        let _guard = lock(&self.write_lock);
        let key = Self::statistics_key(&statistic.user_id);
        let mut history: Vec<GameStatistic> = self.read(&key)?.unwrap_or_default();

        // Newest first; a tie goes in front of the older insert
        let pos = history
            .iter()
            .position(|s| s.played_at <= statistic.played_at)
            .unwrap_or(history.len());
        history.insert(pos, statistic);
        history.truncate(self.history_limit);

        self.write(&key, &history)
    }

    fn recent_statistics(&self, user_id: &str, limit: usize) -> StoreResult<Vec<GameStatistic>> {
        let mut history: Vec<GameStatistic> =
            self.read(&Self::statistics_key(user_id))?.unwrap_or_default();
        history.truncate(limit);
        Ok(history)
    }

    fn is_available(&self) -> bool {
        self.kv.is_available()
    }

    fn backend_name(&self) -> &'static str {
        self.kv.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;

    fn statistic(user: &str, country: &str, played_at: u64) -> GameStatistic {
        GameStatistic {
            id: format!("{country}-{played_at}"),
            user_id: user.to_string(),
            country_name: country.to_string(),
            difficulty: Difficulty::Easy,
            clues_used: 1,
            guesses_made: 1,
            won: true,
            score: 750,
            clues_revealed: Vec::new(),
            played_at,
        }
    }

    #[test]
    fn test_memory_backend() {
        let kv = MemoryKv::new();
        kv.set("a", "1").unwrap();
        assert_eq!(kv.get("a").unwrap().as_deref(), Some("1"));
        assert_eq!(kv.count(), 1);
        kv.remove("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
        assert_eq!(kv.backend_name(), "Memory");
    }

    #[test]
    fn test_memory_unavailable() {
        let kv = MemoryKv::new();
        kv.set_available(false);
        assert!(!kv.is_available());
        assert!(matches!(kv.get("a"), Err(StoreError::Unavailable(_))));
        assert!(kv.set("a", "1").is_err());
    }

    #[test]
    fn test_file_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let kv = FileKv::new(&path);
        assert_eq!(kv.get("missing").unwrap(), None);
        kv.set("quiz_user_id", "abc").unwrap();
        kv.set("other", "x").unwrap();
        kv.remove("other").unwrap();

        let reopened = FileKv::new(&path);
        assert_eq!(reopened.get("quiz_user_id").unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get("other").unwrap(), None);
        assert!(reopened.is_available());
        assert_eq!(reopened.backend_name(), "File");
    }

    #[test]
    fn test_file_backend_corrupt_file_starts_empty() {
        crate::test_logging::init();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{ not json").unwrap();

        let kv = FileKv::new(&path);
        assert_eq!(kv.get("anything").unwrap(), None);
        kv.set("k", "v").unwrap();
        assert_eq!(FileKv::new(&path).get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_create_key_value_for_test_env() {
        let kv = create_key_value(&QuizConfig::test());
        assert_eq!(kv.backend_name(), "Memory");
    }

    #[test]
    fn test_statistics_newest_first_and_capped() {
        let store = KvQuizStore::new(Arc::new(MemoryKv::new()), 3);
        store.insert_statistic(statistic("u", "France", 10)).unwrap();
        store.insert_statistic(statistic("u", "Chile", 30)).unwrap();
        store.insert_statistic(statistic("u", "Peru", 20)).unwrap();
        store.insert_statistic(statistic("u", "Japan", 40)).unwrap();
        store.insert_statistic(statistic("other", "Togo", 50)).unwrap();

        let recent = store.recent_statistics("u", 10).unwrap();
        let names: Vec<&str> = recent.iter().map(|s| s.country_name.as_str()).collect();
        assert_eq!(names, vec!["Japan", "Chile", "Peru"]);

        assert_eq!(store.recent_statistics("u", 1).unwrap().len(), 1);
        assert!(store.recent_statistics("nobody", 5).unwrap().is_empty());
    }

    #[test]
    fn test_insert_if_absent() {
        let store = KvQuizStore::new(Arc::new(MemoryKv::new()), 10);
        let first = store
            .insert_achievements(UserAchievements::new("u", 1))
            .unwrap();
        let second = store
            .insert_achievements(UserAchievements::new("u", 2))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(second.created_at, 1);
    }

    #[test]
    fn test_update_missing_record() {
        let store = KvQuizStore::new(Arc::new(MemoryKv::new()), 10);
        assert!(matches!(
            store.update_achievements(&UserAchievements::new("u", 1)),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.update_settings("u", &SettingsPatch::default(), 1),
            Err(StoreError::NotFound(_))
        ));
    }
}
