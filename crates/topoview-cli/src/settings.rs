use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// One of `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    pub pretty: bool,
    pub sort_children_by_id: bool,
    pub list: ListSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            pretty: true,
            sort_children_by_id: false,
            list: ListSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListSettings {
    pub page_size: usize,
    pub auto_advance: bool,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            page_size: 25,
            auto_advance: false,
        }
    }
}

/// Where the settings came from, reported once logging is up.
#[derive(Debug)]
pub enum SettingsSource {
    File(PathBuf),
    NotFound(PathBuf),
    NoConfigDir,
    Invalid { path: PathBuf, reason: String },
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("topoview").join("settings.json"))
    }

    /// Loads from `explicit` or the default location. Read and parse
    /// failures fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> (Self, SettingsSource) {
        let Some(path) = explicit.map(Path::to_path_buf).or_else(Self::default_path) else {
            return (Self::default(), SettingsSource::NoConfigDir);
        };
        if !path.exists() {
            return (Self::default(), SettingsSource::NotFound(path));
        }
        match Self::load_from(&path) {
            Ok(settings) => (settings, SettingsSource::File(path)),
            Err(err) => (
                Self::default(),
                SettingsSource::Invalid {
                    path,
                    reason: format!("{:#}", err),
                },
            ),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "pretty": false, "list": { "page_size": 5 } }"#).unwrap();

        let (settings, source) = Settings::load(Some(&path));
        assert!(matches!(source, SettingsSource::File(_)));
        assert!(!settings.pretty);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.list.page_size, 5);
        assert!(!settings.list.auto_advance);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            log_level: "debug".to_string(),
            sort_children_by_id: true,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
        assert_eq!(settings.level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let (settings, source) = Settings::load(Some(&path));
        assert_eq!(settings, Settings::default());
        assert!(matches!(source, SettingsSource::Invalid { .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let (_, source) = Settings::load(Some(&dir.path().join("absent.json")));
        assert!(matches!(source, SettingsSource::NotFound(_)));
    }

    #[test]
    fn test_unknown_level_is_warn() {
        let settings = Settings {
            log_level: "loud".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.level(), tracing::Level::WARN);
    }
}
