//! Configuration management for flybox

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::catalog::CATALOG_FILE;
use crate::error::{FlyboxError, Result};
use crate::matcher::DEFAULT_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Material matching settings
    #[serde(default)]
    pub matching: MatchingConfig,

    /// CSV import settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory holding the catalog
    pub data_dir: Option<PathBuf>,
    /// Automatically accept prompts
    #[serde(default)]
    pub auto_yes: bool,
}

/// Matching configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum free-text score for a requirement to count as on hand
    pub threshold: f32,
    /// Largest missing count listed as "almost tie-able"
    pub max_missing: usize,
    /// Only flies at most this many materials away feed the unlock leaderboard
    pub unlock_max_missing: Option<usize>,
}

/// Import configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Category for rows that leave it blank
    pub default_category: String,
    /// Link imported material names to catalog materials
    pub resolve_materials: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable colored output
    pub color: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_missing: 1,
            unlock_max_missing: None,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            default_category: "trout".to_string(),
            resolve_materials: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            color: true,
        }
    }
}

impl Config {
    /// Every key accepted by [`Config::get`] and [`Config::set`]
    pub const KEYS: &'static [&'static str] = &[
        "general.data_dir",
        "general.auto_yes",
        "matching.threshold",
        "matching.max_missing",
        "matching.unlock_max_missing",
        "import.default_category",
        "import.resolve_materials",
        "logging.level",
        "logging.color",
    ];

    /// Default config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FlyboxError::Config("Could not find config directory".into()))?;
        Ok(config_dir.join("flybox").join("config.toml"))
    }

    fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::config_path(),
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from `path`, or the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path)?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`, or the default location
    pub fn save_to(&self, path: Option<&Path>) -> Result<()> {
        let path = Self::resolve_path(path)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| FlyboxError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Reset configuration to defaults
    pub fn reset(path: Option<&Path>) -> Result<()> {
        Self::default().save_to(path)
    }

    /// Initialize the configuration file
    pub fn init(path: Option<&Path>, force: bool) -> Result<PathBuf> {
        let resolved = Self::resolve_path(path)?;

        if resolved.exists() && !force {
            return Err(FlyboxError::Config(
                "Configuration file already exists. Use --force to overwrite.".into(),
            ));
        }

        Self::default().save_to(Some(resolved.as_path()))?;
        Ok(resolved)
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "general.data_dir" => self.general.data_dir.as_ref().map(|p| p.display().to_string()),
            "general.auto_yes" => Some(self.general.auto_yes.to_string()),

            "matching.threshold" => Some(self.matching.threshold.to_string()),
            "matching.max_missing" => Some(self.matching.max_missing.to_string()),
            "matching.unlock_max_missing" => self.matching.unlock_max_missing.map(|n| n.to_string()),

            "import.default_category" => Some(self.import.default_category.clone()),
            "import.resolve_materials" => Some(self.import.resolve_materials.to_string()),

            "logging.level" => Some(self.logging.level.clone()),
            "logging.color" => Some(self.logging.color.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "general.data_dir" => {
                self.general.data_dir = if value.is_empty() { None } else { Some(PathBuf::from(value)) };
            }
            "general.auto_yes" => {
                self.general.auto_yes = value.parse().map_err(|_| {
                    FlyboxError::Config("Invalid boolean for auto_yes".into())
                })?;
            }

            "matching.threshold" => {
                let threshold: f32 = value.parse().map_err(|_| {
                    FlyboxError::Config("Invalid number for threshold".into())
                })?;
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(FlyboxError::Config("threshold must be between 0 and 1".into()));
                }
                self.matching.threshold = threshold;
            }
            "matching.max_missing" => {
                self.matching.max_missing = value.parse().map_err(|_| {
                    FlyboxError::Config("Invalid number for max_missing".into())
                })?;
            }
            "matching.unlock_max_missing" => {
                self.matching.unlock_max_missing = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        FlyboxError::Config("Invalid number for unlock_max_missing".into())
                    })?)
                };
            }

            "import.default_category" => {
                if value.trim().is_empty() {
                    return Err(FlyboxError::Config("default_category cannot be empty".into()));
                }
                self.import.default_category = value.trim().to_string();
            }
            "import.resolve_materials" => {
                self.import.resolve_materials = value.parse().map_err(|_| {
                    FlyboxError::Config("Invalid boolean for resolve_materials".into())
                })?;
            }

            "logging.level" => {
                self.logging.level = value.to_string();
            }
            "logging.color" => {
                self.logging.color = value.parse().map_err(|_| {
                    FlyboxError::Config("Invalid boolean for color".into())
                })?;
            }

            _ => {
                return Err(FlyboxError::Config(format!("Unknown configuration key: {}", key)));
            }
        }

        Ok(())
    }

    /// Get the data directory
    pub fn data_dir(&self) -> PathBuf {
        self.general.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("flybox")
        })
    }

    /// Path of the catalog document
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir().join(CATALOG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.matching.threshold, 0.80);
        assert_eq!(config.matching.max_missing, 1);
        assert_eq!(config.import.default_category, "trout");
        assert!(config.import.resolve_materials);
        assert!(!config.general.auto_yes);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        config.set("general.auto_yes", "true").unwrap();
        assert_eq!(config.get("general.auto_yes"), Some("true".to_string()));

        config.set("matching.max_missing", "3").unwrap();
        assert_eq!(config.get("matching.max_missing"), Some("3".to_string()));

        assert_eq!(config.get("matching.unlock_max_missing"), None);
        config.set("matching.unlock_max_missing", "2").unwrap();
        assert_eq!(config.matching.unlock_max_missing, Some(2));
        config.set("matching.unlock_max_missing", "").unwrap();
        assert_eq!(config.matching.unlock_max_missing, None);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("matching.threshold", "1.5").is_err());
        assert!(config.set("matching.threshold", "high").is_err());
        assert!(config.set("import.default_category", "  ").is_err());
        assert!(config.set("nope.nothing", "1").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_every_key_is_gettable() {
        let mut config = Config::default();
        config.set("general.data_dir", "/tmp/flies").unwrap();
        config.set("matching.unlock_max_missing", "1").unwrap();
        for key in Config::KEYS {
            assert!(config.get(key).is_some(), "{}", key);
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set("matching.threshold", "0.9").unwrap();
        config.set("general.data_dir", "/srv/flybox").unwrap();
        config.save_to(Some(path.as_path())).unwrap();

        let loaded = Config::load_from(Some(path.as_path())).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.catalog_path(), PathBuf::from("/srv/flybox/catalog.json"));

        assert!(Config::init(Some(path.as_path()), false).is_err());
        Config::init(Some(path.as_path()), true).unwrap();
        assert_eq!(Config::load_from(Some(path.as_path())).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nmax_missing = 2\n").unwrap();

        let config = Config::load_from(Some(path.as_path())).unwrap();
        assert_eq!(config.matching.max_missing, 2);
        assert_eq!(config.matching.threshold, DEFAULT_THRESHOLD);
        assert_eq!(config.logging.level, "info");
    }
}
