use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Pt,
}

/// Persisted, process-wide settings. The backing store lives with the
/// backend; the client only ever reads the full object and writes partial
/// patches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub auto_connect: bool,
    #[serde(default = "default_true")]
    pub game_sync_enabled: bool,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub user_volumes: HashMap<UserId, u16>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            auto_connect: false,
            game_sync_enabled: true,
            language: Language::default(),
            user_volumes: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Partial settings write. Only the keys that are `Some` are serialized;
/// the backend merges them last-write-wins into the stored object, so a
/// single-key patch never clobbers its siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_connect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_sync_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_volumes: Option<HashMap<UserId, u16>>,
}

impl SettingsPatch {
    pub fn notifications_enabled(enabled: bool) -> Self {
        Self {
            notifications_enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn auto_connect(enabled: bool) -> Self {
        Self {
            auto_connect: Some(enabled),
            ..Self::default()
        }
    }

    pub fn game_sync_enabled(enabled: bool) -> Self {
        Self {
            game_sync_enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn language(language: Language) -> Self {
        Self {
            language: Some(language),
            ..Self::default()
        }
    }

    pub fn user_volumes(volumes: HashMap<UserId, u16>) -> Self {
        Self {
            user_volumes: Some(volumes),
            ..Self::default()
        }
    }

    /// Merge this patch into a full settings object, the same way the
    /// backend applies a partial save.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(v) = self.notifications_enabled {
            settings.notifications_enabled = v;
        }
        if let Some(v) = self.auto_connect {
            settings.auto_connect = v;
        }
        if let Some(v) = self.game_sync_enabled {
            settings.game_sync_enabled = v;
        }
        if let Some(v) = self.language {
            settings.language = v;
        }
        if let Some(v) = &self.user_volumes {
            settings.user_volumes = v.clone();
        }
    }
}
