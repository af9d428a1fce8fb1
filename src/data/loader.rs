//! RON config loader
//!
//! Loads the itemization config from a RON file, with fallback to the
//! compiled-in defaults, and holds the live snapshot for reloads.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::config::ItemizationConfig;

/// File name used inside the config directory
pub const CONFIG_FILE_NAME: &str = "itemization.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Default config location (platform config dir, else ./config)
pub fn default_config_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "affixforge", "Affixforge") {
        proj_dirs.config_dir().join(CONFIG_FILE_NAME)
    } else {
        PathBuf::from("./config").join(CONFIG_FILE_NAME)
    }
}

/// Parse a config file. Missing sections take their defaults.
pub fn load_config(path: &Path) -> Result<ItemizationConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a config file, falling back to defaults when it is missing or broken
pub fn load_config_or_default(path: &Path) -> ItemizationConfig {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return ItemizationConfig::default();
    }
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            ItemizationConfig::default()
        }
    }
}

/// Write the default config as pretty RON, creating parent directories
pub fn export_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let ron = ron::ser::to_string_pretty(&ItemizationConfig::default(), ron::ser::PrettyConfig::default())?;
    fs::write(path, ron).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Exported default config to {}", path.display());
    Ok(())
}

/// Live config snapshot. Readers clone the `Arc` and keep a consistent view
/// even if a reload lands mid-operation.
#[derive(Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    current: RwLock<Arc<ItemizationConfig>>,
}

impl ConfigStore {
    /// Store holding a fixed config with no backing file
    pub fn new(config: ItemizationConfig) -> Self {
        Self {
            path: None,
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Store backed by a file, loaded immediately with default fallback
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = load_config_or_default(&path);
        Self {
            path: Some(path),
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<ItemizationConfig> {
        Arc::clone(&self.current.read())
    }

    /// Swap in a new config
    pub fn replace(&self, config: ItemizationConfig) {
        *self.current.write() = Arc::new(config);
    }

    /// Re-read the backing file. On error the previous snapshot stays live.
    pub fn reload(&self) -> Result<Arc<ItemizationConfig>, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(self.snapshot());
        };
        let config = Arc::new(load_config(path)?);
        *self.current.write() = Arc::clone(&config);
        log::info!("Reloaded itemization config from {}", path.display());
        Ok(config)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ItemizationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("affixforge-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_export_then_load() {
        let path = temp_path("export_then_load.ron");
        let result = export_default_config(&path);
        assert!(result.is_ok(), "Failed to export default config: {:?}", result.err());

        let loaded = load_config(&path).expect("exported config should parse");
        assert_eq!(loaded, ItemizationConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let path = temp_path("partial.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(debug_logging: true, catalyst: (reimbue_currency_cost: 40))").unwrap();

        let loaded = load_config(&path).unwrap();
        assert!(loaded.debug_logging);
        assert_eq!(loaded.catalyst.reimbue_currency_cost, 40);
        assert!(loaded.catalyst.allow_overwrite);
        assert_eq!(loaded.rarity_model, ItemizationConfig::default().rarity_model);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_broken_file_falls_back() {
        let path = temp_path("broken.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(debug_logging: maybe").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(load_config_or_default(&path), ItemizationConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_reload_keeps_old_snapshot_on_error() {
        let path = temp_path("reload.ron");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "(debug_logging: true)").unwrap();

        let store = ConfigStore::from_path(&path);
        let before = store.snapshot();
        assert!(before.debug_logging);

        fs::write(&path, "not ron at all (").unwrap();
        assert!(store.reload().is_err());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));

        fs::write(&path, "(debug_logging: false)").unwrap();
        let reloaded = store.reload().unwrap();
        assert!(!reloaded.debug_logging);
        let _ = fs::remove_file(&path);
    }
}
