use crate::models::game::Difficulty;
use serde::{Deserialize, Serialize};

/// User configuration from Parlor Config.yaml
///
/// Every section and field carries a serde default so a partial or
/// missing file still produces a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub game: GameDefaults,

    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub debug_mode: bool,
}

/// Starting configuration for the guessing game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDefaults {
    #[serde(default = "default_min_range")]
    pub min_range: i64,

    #[serde(default = "default_max_range")]
    pub max_range: i64,

    #[serde(default = "default_difficulty")]
    pub difficulty: Difficulty,
}

/// Library store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySettings {
    /// Store file name or path; relative values resolve against the
    /// configuration directory
    #[serde(default = "default_store_file")]
    pub store_file: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            game: GameDefaults::default(),
            library: LibrarySettings::default(),
            debug_mode: false,
        }
    }
}

impl Default for GameDefaults {
    fn default() -> Self {
        Self {
            min_range: default_min_range(),
            max_range: default_max_range(),
            difficulty: default_difficulty(),
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            store_file: default_store_file(),
        }
    }
}

fn default_min_range() -> i64 {
    1
}

fn default_max_range() -> i64 {
    100
}

fn default_difficulty() -> Difficulty {
    Difficulty::Unlimited
}

fn default_store_file() -> String {
    "library.json".to_string()
}
