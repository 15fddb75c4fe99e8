use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const CONFIG_VERSION: u64 = 1;

pub const DEFAULT_WEATHER_URL: &str = "http://localhost:8000/api";

const WEATHER_URL_VAR: &str = "SOJOURN_WEATHER_URL";
const DATA_DIR_VAR: &str = "SOJOURN_DATA_DIR";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("sojourn")
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SojournConfig {
    pub version: u64,
    pub data_directory: PathBuf,
    pub weather_base_url: String,
    pub debug_logging: bool,
}

impl Default for SojournConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data_directory: default_data_dir(),
            weather_base_url: default_weather_url(),
            debug_logging: false,
        }
    }
}

impl SojournConfig {
    /// Location of the config file under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("sojourn")
            .join("config.json")
    }

    /// Read a config file strictly. A missing file is an error here.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load the config from `path`, falling back to defaults, then apply env overrides.
    pub fn load(path: &Path) -> Self {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// `load` with the environment lookup supplied by the caller.
    pub fn load_with(path: &Path, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = match Self::from_file(path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        };
        config.apply_overrides(env);
        config
    }

    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(url) = env(WEATHER_URL_VAR) {
            if !url.trim().is_empty() {
                self.weather_base_url = url.trim().to_string();
            }
        }
        if let Some(dir) = env(DATA_DIR_VAR) {
            if !dir.trim().is_empty() {
                self.data_directory = PathBuf::from(dir.trim());
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "debug_logging": true }"#).unwrap();

        let config = SojournConfig::from_file(&path).unwrap();
        assert!(config.debug_logging);
        assert_eq!(config.weather_base_url, DEFAULT_WEATHER_URL);
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn save_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = SojournConfig {
            data_directory: dir.path().join("data"),
            weather_base_url: "http://weather.test/api".into(),
            ..SojournConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(SojournConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn invalid_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            SojournConfig::from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SojournConfig::load_with(&dir.path().join("absent.json"), no_env);
        assert_eq!(config, SojournConfig::default());
    }

    #[test]
    fn load_garbage_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ weather_base_url: ").unwrap();
        assert_eq!(SojournConfig::load_with(&path, no_env), SojournConfig::default());
    }

    #[test]
    fn load_reads_process_env_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let config = SojournConfig::load(&dir.path().join("absent.json"));
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(!config.debug_logging);
    }

    #[test]
    fn env_overrides_file_and_ignores_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        SojournConfig {
            data_directory: dir.path().join("from-file"),
            weather_base_url: "http://file.test/api".into(),
            ..SojournConfig::default()
        }
        .save(&path)
        .unwrap();

        let vars: HashMap<&str, &str> = [
            (WEATHER_URL_VAR, " http://env.test/api "),
            (DATA_DIR_VAR, "/tmp/sojourn-env"),
        ]
        .into_iter()
        .collect();
        let config = SojournConfig::load_with(&path, |name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.weather_base_url, "http://env.test/api");
        assert_eq!(config.data_directory, PathBuf::from("/tmp/sojourn-env"));

        let blanks = |_: &str| Some("   ".to_string());
        let config = SojournConfig::load_with(&path, blanks);
        assert_eq!(config.weather_base_url, "http://file.test/api");
        assert_eq!(config.data_directory, dir.path().join("from-file"));
    }

    #[test]
    fn ensure_directories_creates_nested_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = SojournConfig {
            data_directory: dir.path().join("a").join("b").join("sojourn"),
            ..SojournConfig::default()
        };
        config.ensure_directories().unwrap();
        config.ensure_directories().unwrap();
        assert!(config.data_directory.is_dir());
    }
}
