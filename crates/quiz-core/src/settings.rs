//! Player preferences

use crate::clock::Clock;
use crate::difficulty::Difficulty;
use crate::error::QuizError;
use crate::store::QuizStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Theme preference. Rendering it is the host's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        })
    }
}

impl FromStr for Theme {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(QuizError::InvalidSetting(format!("unknown theme '{other}'"))),
        }
    }
}

/// Persisted preference record, one per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    /// User identity
    pub id: String,
    pub theme_preference: Theme,
    #[serde(default)]
    pub custom_theme: Option<String>,
    pub welcome_modal_dismissed: bool,
    pub preferred_difficulty: Difficulty,
    pub sound_enabled: bool,
    /// Unix milliseconds
    pub created_at: u64,
    pub updated_at: u64,
}

impl UserSettings {
    pub fn defaults(user_id: &str, now_ms: u64) -> Self {
        Self {
            id: user_id.to_string(),
            theme_preference: Theme::System,
            custom_theme: None,
            welcome_modal_dismissed: false,
            preferred_difficulty: Difficulty::Easy,
            sound_enabled: true,
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    pub fn apply_patch(&mut self, patch: &SettingsPatch, now_ms: u64) {
        if let Some(theme) = patch.theme_preference {
            self.theme_preference = theme;
        }
        if let Some(ref custom) = patch.custom_theme {
            self.custom_theme = custom.clone();
        }
        if let Some(dismissed) = patch.welcome_modal_dismissed {
            self.welcome_modal_dismissed = dismissed;
        }
        if let Some(difficulty) = patch.preferred_difficulty {
            self.preferred_difficulty = difficulty;
        }
        if let Some(sound) = patch.sound_enabled {
            self.sound_enabled = sound;
        }
        self.updated_at = now_ms;
    }
}

/// Partial update of [`UserSettings`]; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub theme_preference: Option<Theme>,
    /// `Some(None)` clears the custom theme
    pub custom_theme: Option<Option<String>>,
    pub welcome_modal_dismissed: Option<bool>,
    pub preferred_difficulty: Option<Difficulty>,
    pub sound_enabled: Option<bool>,
}

/// Reads and updates the settings of one user
pub struct SettingsService {
    store: Arc<dyn QuizStore>,
    clock: Arc<dyn Clock>,
    user_id: String,
}

impl SettingsService {
    pub fn new(store: Arc<dyn QuizStore>, clock: Arc<dyn Clock>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Stored settings, created with defaults on first use.
    ///
    /// Never fails: if the store is unreachable the defaults are returned unsaved.
    pub fn get_or_create(&self) -> UserSettings {
        let now = self.clock.now_ms();
        match self.store.get_settings(&self.user_id) {
            Ok(Some(settings)) => return settings,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "failed to read user settings"),
        }

        match self
            .store
            .insert_settings(UserSettings::defaults(&self.user_id, now))
        {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "failed to create user settings, using defaults");
                UserSettings::defaults(&self.user_id, now)
            }
        }
    }

    /// Apply a patch; `None` if it could not be saved
    pub fn update(&self, patch: &SettingsPatch) -> Option<UserSettings> {
        // Make sure there is a record to update
        self.get_or_create();
        match self
            .store
            .update_settings(&self.user_id, patch, self.clock.now_ms())
        {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(error = %e, "failed to update user settings");
                None
            }
        }
    }

    pub fn dismiss_welcome(&self) -> Option<UserSettings> {
        self.update(&SettingsPatch {
            welcome_modal_dismissed: Some(true),
            ..Default::default()
        })
    }

    pub fn update_theme(&self, theme: Theme) -> Option<UserSettings> {
        self.update(&SettingsPatch {
            theme_preference: Some(theme),
            ..Default::default()
        })
    }

    pub fn update_preferred_difficulty(&self, difficulty: Difficulty) -> Option<UserSettings> {
        self.update(&SettingsPatch {
            preferred_difficulty: Some(difficulty),
            ..Default::default()
        })
    }

    pub fn set_sound_enabled(&self, enabled: bool) -> Option<UserSettings> {
        self.update(&SettingsPatch {
            sound_enabled: Some(enabled),
            ..Default::default()
        })
    }
}
