use std::path::PathBuf;
use std::time::Duration;

/// Name of the file-backed store inside the data directory
pub const STORE_FILE_NAME: &str = "country_quiz.json";

/// Deployment environment, picks the persistence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Local play - file-based storage
    Local,
    /// Testing - in-memory storage
    Test,
}

impl Environment {
    /// Detect environment from the QUIZ_ENV variable
    pub fn detect() -> Self {
        match std::env::var("QUIZ_ENV").as_deref() {
            Ok("test") | Ok("testing") => Environment::Test,
            _ => Environment::Local,
        }
    }
}

/// Runtime configuration shared by the hosts
#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub environment: Environment,
    /// Overrides the platform data directory
    pub data_dir: Option<PathBuf>,
    /// Default number of games shown in the recent-games list
    pub recent_games_limit: usize,
    /// Game statistics kept per user
    pub history_limit: usize,
    /// How long a cached catalog stays fresh
    pub catalog_ttl: Duration,
    /// Bump to invalidate catalog caches written by older builds
    pub catalog_cache_version: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            data_dir: None,
            recent_games_limit: 10,
            history_limit: 1000,
            catalog_ttl: Duration::from_secs(24 * 60 * 60),
            catalog_cache_version: 3,
        }
    }
}

impl QuizConfig {
    /// Defaults overlaid with QUIZ_ENV and QUIZ_DATA_DIR
    pub fn from_env() -> Self {
        Self {
            environment: Environment::detect(),
            data_dir: std::env::var_os("QUIZ_DATA_DIR").map(PathBuf::from),
            ..Self::default()
        }
    }

    /// In-memory configuration for tests
    pub fn test() -> Self {
        Self {
            environment: Environment::Test,
            ..Self::default()
        }
    }

    /// Directory holding the local store
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("country-quiz")
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.resolved_data_dir().join(STORE_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QuizConfig::default();
        assert_eq!(config.recent_games_limit, 10);
        assert_eq!(config.catalog_ttl, Duration::from_secs(86_400));
        assert_eq!(config.catalog_cache_version, 3);
    }

    #[test]
    fn test_data_dir_override() {
        let config = QuizConfig {
            data_dir: Some(PathBuf::from("/tmp/quiz")),
            ..QuizConfig::default()
        };
        assert_eq!(config.store_path(), PathBuf::from("/tmp/quiz/country_quiz.json"));
    }

    #[test]
    fn test_environment_detection() {
        // Default should be Local unless QUIZ_ENV says otherwise
        if std::env::var("QUIZ_ENV").is_err() {
            assert_eq!(Environment::detect(), Environment::Local);
        }
    }
}
