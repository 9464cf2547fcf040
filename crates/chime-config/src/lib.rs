//! # chime-config
//!
//! Loading and saving chime's JSON configuration file.
//!
//! Field names are camelCase on disk to match the browser UI conventions.
//! Loading merges the file over documented defaults, so a config written by
//! an older version keeps sane values for fields it does not mention, and a
//! missing file is not an error.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("read {path}: {source}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file or its parent directory could not be written.
    #[error("write {path}: {source}")]
    Write {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected shape.
    #[error("parse {path}: {source}")]
    Parse {
        /// Path being parsed.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The configuration could not be serialized.
    #[error("serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// All user-configurable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP port the server listens on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Open the browser UI automatically on `serve`.
    #[serde(default = "default_auto_open")]
    pub auto_open: bool,
    /// Name of the sound pack the UI plays.
    #[serde(default = "default_active_pack")]
    pub active_pack: String,
    /// Root directory of session logs to watch. May start with `~`.
    #[serde(default = "default_watch_path")]
    pub watch_path: String,
    /// How long a session may be silent before the UI considers it idle.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout: String,
    /// Per-category volume overrides (0.0 to 1.0).
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_volumes: HashMap<String, f64>,
    /// Session names the UI keeps muted.
    #[serde(default, deserialize_with = "null_as_default")]
    pub muted_sessions: Vec<String>,
    /// Event-name to sound-name overrides.
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_overrides: HashMap<String, String>,
}

fn default_port() -> u16 {
    3333
}

fn default_auto_open() -> bool {
    true
}

fn default_active_pack() -> String {
    "default".to_string()
}

fn default_watch_path() -> String {
    "~/.claude/projects".to_string()
}

fn default_idle_timeout() -> String {
    "5m".to_string()
}

/// Accepts an explicit JSON `null` where a collection is expected, so a
/// hand-edited `"categoryVolumes": null` loads as empty instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            auto_open: default_auto_open(),
            active_pack: default_active_pack(),
            watch_path: default_watch_path(),
            idle_timeout: default_idle_timeout(),
            category_volumes: HashMap::new(),
            muted_sessions: Vec::new(),
            event_overrides: HashMap::new(),
        }
    }
}

impl Config {
    /// Load the configuration at `path`, merging it over defaults.
    ///
    /// A missing file returns the defaults — first launch is not an error.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        serde_json::from_slice(&data).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save the configuration to `path` as indented JSON, creating missing
    /// parent directories.
    ///
    /// # Errors
    ///
    /// Fails when the parent directory or the file cannot be written.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let data = serde_json::to_vec_pretty(self).map_err(ConfigError::Serialize)?;

        std::fs::write(path, data).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Partial configuration update, as accepted by `PUT /api/config`.
///
/// Unknown fields are rejected so client typos surface as errors instead of
/// silently dropping settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigUpdate {
    /// New HTTP port.
    pub port: Option<u16>,
    /// New auto-open setting.
    pub auto_open: Option<bool>,
    /// New active pack name.
    pub active_pack: Option<String>,
    /// New watch root.
    pub watch_path: Option<String>,
    /// New idle timeout.
    pub idle_timeout: Option<String>,
    /// Replacement category volume map.
    pub category_volumes: Option<HashMap<String, f64>>,
    /// Replacement muted session list.
    pub muted_sessions: Option<Vec<String>>,
    /// Replacement event override map.
    pub event_overrides: Option<HashMap<String, String>>,
}

impl ConfigUpdate {
    /// Apply every present field onto `config`, leaving the rest untouched.
    pub fn apply(self, config: &mut Config) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(auto_open) = self.auto_open {
            config.auto_open = auto_open;
        }
        if let Some(active_pack) = self.active_pack {
            config.active_pack = active_pack;
        }
        if let Some(watch_path) = self.watch_path {
            config.watch_path = watch_path;
        }
        if let Some(idle_timeout) = self.idle_timeout {
            config.idle_timeout = idle_timeout;
        }
        if let Some(category_volumes) = self.category_volumes {
            config.category_volumes = category_volumes;
        }
        if let Some(muted_sessions) = self.muted_sessions {
            config.muted_sessions = muted_sessions;
        }
        if let Some(event_overrides) = self.event_overrides {
            config.event_overrides = event_overrides;
        }
    }
}

/// Canonical location of the config file: `~/.config/chime/config.json`.
///
/// When the home directory cannot be resolved the tilde form is returned
/// verbatim for the caller to surface.
#[must_use]
pub fn default_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".config").join("chime").join("config.json"),
        None => PathBuf::from("~/.config/chime/config.json"),
    }
}

/// Canonical location of installed sound packs:
/// `~/.config/chime/soundpacks`.
#[must_use]
pub fn default_packs_dir() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".config").join("chime").join("soundpacks"),
        None => PathBuf::from("~/.config/chime/soundpacks"),
    }
}

/// Expand a leading `~` or `~/` to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.port, 3333);
        assert!(config.auto_open);
        assert_eq!(config.active_pack, "default");
        assert_eq!(config.watch_path, "~/.claude/projects");
        assert_eq!(config.idle_timeout, "5m");
        assert!(config.category_volumes.is_empty());
        assert!(config.muted_sessions.is_empty());
        assert!(config.event_overrides.is_empty());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_merges_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"port": 4444, "activePack": "arcademix"}"#).unwrap();

        let config = Config::load(&path).unwrap();

        assert_eq!(config.port, 4444);
        assert_eq!(config.active_pack, "arcademix");
        // Unmentioned fields keep their defaults.
        assert!(config.auto_open);
        assert_eq!(config.watch_path, "~/.claude/projects");
    }

    #[test]
    fn test_load_repairs_null_collections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"categoryVolumes": null, "mutedSessions": null, "eventOverrides": null}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();

        assert!(config.category_volumes.is_empty());
        assert!(config.muted_sessions.is_empty());
        assert!(config.event_overrides.is_empty());
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_save_round_trips_and_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dirs").join("config.json");

        let config = Config {
            port: 4001,
            category_volumes: HashMap::from([("ambient".to_string(), 0.25)]),
            muted_sessions: vec!["scratch".to_string()],
            ..Config::default()
        };

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_saved_file_uses_camel_case_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        Config::default().save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"activePack\""));
        assert!(raw.contains("\"watchPath\""));
        assert!(raw.contains("\"categoryVolumes\""));
        assert!(!raw.contains("\"active_pack\""));
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut config = Config::default();
        let update: ConfigUpdate =
            serde_json::from_str(r#"{"port": 5000, "mutedSessions": ["a"]}"#).unwrap();

        update.apply(&mut config);

        assert_eq!(config.port, 5000);
        assert_eq!(config.muted_sessions, vec!["a".to_string()]);
        assert_eq!(config.active_pack, "default");
    }

    #[test]
    fn test_update_rejects_unknown_fields() {
        let result = serde_json::from_str::<ConfigUpdate>(r#"{"volume": 1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();

        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/x/y"), home.join("x/y"));
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("rel/path"), PathBuf::from("rel/path"));
    }
}
