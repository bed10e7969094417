use thiserror::Error;

/// Errors surfaced by the quiz engine to its host.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The country catalog could not be loaded from the source or any cache
    #[error("Country catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// Outline data could not be loaded
    #[error("Outline data unavailable: {0}")]
    GeoDataUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid share link: {0}")]
    InvalidShareLink(String),

    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("Unknown clue: {0}")]
    UnknownClue(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// A saved game whose fields contradict each other
    #[error("Invalid game state: {0}")]
    InvalidGameState(String),
}

pub type QuizResult<T> = Result<T, QuizError>;

/// Errors that can occur during persistence operations
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Backend is not reachable (offline, disabled, quota exceeded)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing medium failed
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// A stored document could not be encoded or decoded
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// The record to update does not exist
    #[error("Record not found: {0}")]
    NotFound(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}
