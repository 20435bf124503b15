//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/blockfall/settings.toml (or platform equivalent)

use crate::pacing::PacingConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize settings")]
    Serialize(#[from] toml::ser::Error),
}

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Optional tile definition file; the built-in set is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_file: Option<PathBuf>,
    /// Fixed seed for reproducible piece sequences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Playfield size
    pub board: BoardSettings,
    /// Gravity, ramp and input rates
    pub timing: PacingConfig,
    /// Keybindings
    pub keys: KeyBindings,
}

/// Playfield size. Values below 4 rows or 10 columns are raised to those minimums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub height: usize,
    pub width: usize,
}

/// Key bindings (stored as strings for easy editing)
/// Each action can have one or more keys bound to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_cw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub rotate_ccw: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_left: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub move_right: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub soft_drop: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub restart: Vec<String>,
    #[serde(deserialize_with = "deserialize_keys", serialize_with = "serialize_keys")]
    pub quit: Vec<String>,
}

/// Deserialize keys as either a single string or array of strings
fn deserialize_keys<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct KeysVisitor;

    impl<'de> Visitor<'de> for KeysVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or array of strings")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut keys = Vec::new();
            while let Some(key) = seq.next_element::<String>()? {
                keys.push(key);
            }
            Ok(keys)
        }
    }

    deserializer.deserialize_any(KeysVisitor)
}

/// Serialize keys: single key as string, multiple as array
fn serialize_keys<S>(keys: &[String], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeSeq;

    if keys.len() == 1 {
        serializer.serialize_str(&keys[0])
    } else {
        let mut seq = serializer.serialize_seq(Some(keys.len()))?;
        for key in keys {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            height: 26,
            width: 11,
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            rotate_cw: vec!["e".to_string()],
            rotate_ccw: vec!["q".to_string()],
            move_left: vec!["a".to_string()],
            move_right: vec!["d".to_string()],
            soft_drop: vec!["s".to_string()],
            restart: vec!["r".to_string()],
            quit: vec!["Esc".to_string()],
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "blockfall", "blockfall")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from file, or create default
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from `path`. A missing file is not an error.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn from_toml(contents: &str) -> Self {
        toml::from_str(contents).unwrap_or_else(|e| {
            warn!("Ignoring malformed settings: {}", e);
            Self::default()
        })
    }

    /// Save settings to file
    pub fn save(&self) -> Result<(), SettingsError> {
        let dir = Self::config_dir().ok_or(SettingsError::NoConfigDir)?;
        let path = dir.join("settings.toml");

        // Create directory if needed
        fs::create_dir_all(&dir).map_err(|source| SettingsError::Io {
            path: dir.clone(),
            source,
        })?;

        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents).map_err(|source| SettingsError::Io { path, source })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_layout() {
        let settings = Settings::default();
        assert_eq!(settings.board.height, 26);
        assert_eq!(settings.board.width, 11);
        assert_eq!(settings.timing, PacingConfig::default());
        assert_eq!(settings.keys.rotate_cw, vec!["e"]);
        assert_eq!(settings.tile_file, None);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let settings = Settings::from_toml(
            r#"
            seed = 7

            [board]
            width = 14

            [keys]
            move_left = ["a", "Left"]
            "#,
        );
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.board.width, 14);
        assert_eq!(settings.board.height, 26);
        assert_eq!(settings.keys.move_left, vec!["a", "Left"]);
        assert_eq!(settings.keys.move_right, vec!["d"]);
        assert_eq!(settings.timing.input_rate, 60.0);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        assert_eq!(Settings::from_toml("board = 3"), Settings::default());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("blockfall-no-such-dir/settings.toml");
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_from_unreadable_path_uses_defaults() {
        // A directory exists but cannot be read as a file
        let dir = std::env::temp_dir();
        assert_eq!(Settings::load_from(&dir), Settings::default());
    }

    #[test]
    fn test_load_from_reads_file() {
        let name = format!("blockfall-{:08x}.toml", rand::random::<u32>());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, "seed = 11\n").unwrap();
        let settings = Settings::load_from(&path);
        fs::remove_file(&path).unwrap();
        assert_eq!(settings.seed, Some(11));
    }

    #[test]
    fn test_round_trip() {
        let mut settings = Settings::default();
        settings.keys.soft_drop = vec!["s".to_string(), "Down".to_string()];
        settings.tile_file = Some(PathBuf::from("tiles.txt"));
        settings.timing.base_fall_rate = 2.0;

        let text = toml::to_string_pretty(&settings).unwrap();
        assert!(text.contains("rotate_cw = \"e\""));
        assert_eq!(Settings::from_toml(&text), settings);
    }
}
