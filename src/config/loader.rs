//! Configuration loader with tier-based merging.
//!
//! The shipped defaults are merged with the server's `config.yml` from the
//! plugin data directory; server values win key by key.

use super::merge::deep_merge_all;
use super::store::ConfigStore;
use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default configuration shipped with the plugin.
pub const DEFAULT_CONFIG: &str = include_str!("../../config/config.yml");

/// File name of the server configuration inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Data directory used when `VTL_DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "plugins/VillagerTradeLimiter";

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// `config.yml` in the plugin data directory
    Server = 1,
    /// A file named explicitly by `VTL_CONFIG_PATH` or `--config`; replaces all tiers
    Explicit = 2,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Server => write!(f, "server"),
            ConfigTier::Explicit => write!(f, "explicit"),
        }
    }
}

/// Where configuration is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Plugin data directory holding `config.yml`
    pub data_dir: Option<PathBuf>,
    /// Explicit config file; bypasses tier merging when set
    pub config_file: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover paths from `VTL_CONFIG_PATH` and `VTL_DATA_DIR`.
    pub fn discover() -> Self {
        let data_dir = std::env::var("VTL_DATA_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from(DEFAULT_DATA_DIR)));

        let config_file = std::env::var("VTL_CONFIG_PATH").ok().map(PathBuf::from);

        Self {
            data_dir,
            config_file,
        }
    }

    /// Paths rooted at an explicit data directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            config_file: None,
        }
    }

    /// Paths naming a single config file.
    pub fn with_config_file(config_file: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: None,
            config_file: Some(config_file.into()),
        }
    }

    /// The server-tier config file, if a data directory is known.
    pub fn server_config(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// The file a reload should watch or re-read.
    pub fn effective_config(&self) -> Option<PathBuf> {
        self.config_file.clone().or_else(|| self.server_config())
    }
}

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    store: ConfigStore,
    /// Path to the config file that was used (if any)
    config_path: Option<PathBuf>,
    tiers: Vec<ConfigTier>,
}

impl ConfigLoader {
    /// Load configuration with explicit paths.
    ///
    /// A missing server config is not an error; an unreadable or malformed one is.
    pub fn load_with_paths(paths: ConfigPaths) -> ConfigResult<Self> {
        if let Some(ref explicit) = paths.config_file {
            let value = read_yaml(explicit)?;
            let store = ConfigStore::from_yaml(value)?;
            info!("Loaded config from {}", explicit.display());
            return Ok(Self {
                config_path: Some(explicit.clone()),
                paths,
                store,
                tiers: vec![ConfigTier::Explicit],
            });
        }

        let mut configs: Vec<Value> = Vec::new();
        let mut tiers = Vec::new();

        // Tier 1: Defaults (embedded)
        let defaults: Value = serde_yaml::from_str(DEFAULT_CONFIG)
            .map_err(|e| ConfigError::yaml(None, e))?;
        configs.push(defaults);
        tiers.push(ConfigTier::Defaults);

        // Tier 2: Server config
        let mut config_path = None;
        if let Some(server_config) = paths.server_config() {
            if server_config.exists() {
                configs.push(read_yaml(&server_config)?);
                tiers.push(ConfigTier::Server);
                info!("Loaded config from {}", server_config.display());
                config_path = Some(server_config);
            } else {
                debug!(
                    "No server config at {}, using defaults",
                    server_config.display()
                );
            }
        }

        let merged = deep_merge_all(configs);
        let store = ConfigStore::from_yaml(merged)?;

        Ok(Self {
            paths,
            store,
            config_path,
            tiers,
        })
    }

    /// Write the shipped defaults to the data directory unless a config
    /// already exists there. Returns the path when a file was written.
    pub fn save_default_config(paths: &ConfigPaths) -> ConfigResult<Option<PathBuf>> {
        let Some(target) = paths.server_config() else {
            return Ok(None);
        };
        if target.exists() {
            return Ok(None);
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        std::fs::write(&target, DEFAULT_CONFIG).map_err(|e| ConfigError::io(&target, e))?;
        info!("Wrote default config to {}", target.display());
        Ok(Some(target))
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn into_store(self) -> ConfigStore {
        self.store
    }

    /// Get the config file path that was used.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Tiers that contributed, lowest priority first.
    pub fn tiers(&self) -> &[ConfigTier] {
        &self.tiers
    }
}

fn read_yaml(path: &Path) -> ConfigResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::yaml(Some(path.to_path_buf()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_parses() {
        let store = ConfigStore::from_yaml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(store.get_int("MaxDemand", 0), -1);
        assert_eq!(store.get_int("MaxHeroLevel", 0), 1);
        assert_eq!(store.get_double("MaxDiscount", 0.0), 0.3);
        assert!(!store.get_bool("DisableTrading", true));
        assert!(store.section("Overrides").unwrap().is_empty());
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_data_dir(temp.path().join("missing"));

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.tiers(), &[ConfigTier::Defaults]);
        assert!(loader.config_path().is_none());
        assert_eq!(loader.store().get_int("MaxDemand", 0), -1);
    }

    #[test]
    fn test_server_config_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "MaxDemand: 10\nOverrides:\n  DIAMOND:\n    MaxDemand: 2\n",
        )
        .unwrap();

        let loader = ConfigLoader::load_with_paths(ConfigPaths::with_data_dir(temp.path())).unwrap();
        let store = loader.store();

        assert_eq!(loader.tiers(), &[ConfigTier::Defaults, ConfigTier::Server]);
        assert_eq!(store.get_int("MaxDemand", 0), 10);
        // Untouched keys come from defaults
        assert_eq!(store.get_int("MaxHeroLevel", 0), 1);
        assert_eq!(store.get_int("Overrides.DIAMOND.MaxDemand", 0), 2);
    }

    #[test]
    fn test_explicit_file_bypasses_defaults() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("custom.yml");
        std::fs::write(&file, "MaxDemand: 3\n").unwrap();

        let loader = ConfigLoader::load_with_paths(ConfigPaths::with_config_file(&file)).unwrap();
        assert_eq!(loader.tiers(), &[ConfigTier::Explicit]);
        assert_eq!(loader.store().get_int("MaxDemand", 0), 3);
        assert!(!loader.store().contains("MaxHeroLevel"));
    }

    #[test]
    fn test_malformed_server_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "MaxDemand: [\n").unwrap();

        let err = ConfigLoader::load_with_paths(ConfigPaths::with_data_dir(temp.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { path: Some(_), .. }));
    }

    #[test]
    fn test_save_default_config_once() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_data_dir(temp.path().join("plugin"));

        let written = ConfigLoader::save_default_config(&paths).unwrap();
        assert_eq!(written, Some(temp.path().join("plugin").join(CONFIG_FILE_NAME)));
        assert_eq!(ConfigLoader::save_default_config(&paths).unwrap(), None);
    }
}
