//! Operator settings and favorites, persisted as JSON in the data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::atomic::{atomic_write, StoreError};
use crate::elevation::DEFAULT_ELEVATION_TOOL;

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// `<platform data dir>/helpcmd`, or the working directory when the platform
/// has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("helpcmd"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub confirm_critical: bool,
    pub show_admin_warnings: bool,
    pub favorites: Vec<String>,
    pub elevation_tool: String,
    pub history_limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            confirm_critical: true,
            show_admin_warnings: true,
            favorites: Vec::new(),
            elevation_tool: DEFAULT_ELEVATION_TOOL.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            log_file: None,
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
    config: AppConfig,
    load_warning: Option<String>,
}

impl ConfigStore {
    /// Load `config.json` from `data_dir`. A missing file gives defaults; so
    /// does a corrupt one, with a warning.
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let (config, load_warning) = match Self::read(&path) {
            Ok(Some(config)) => (config, None),
            Ok(None) => (AppConfig::default(), None),
            Err(e) => {
                let warning = format!("{}; using defaults", e);
                log::warn!("[config] {}", warning);
                (AppConfig::default(), Some(warning))
            }
        };
        Self {
            path,
            config,
            load_warning,
        }
    }

    /// The warning logged while loading, if the file on disk was unusable.
    pub fn load_warning(&self) -> Option<&str> {
        self.load_warning.as_deref()
    }

    fn read(path: &Path) -> Result<Option<AppConfig>, StoreError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.config).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        atomic_write(&self.path, &json)?;
        log::debug!("[config] Saved {:?}", self.path);
        Ok(())
    }

    pub fn is_favorite(&self, key: &str) -> bool {
        self.config
            .favorites
            .iter()
            .any(|f| f.eq_ignore_ascii_case(key.trim()))
    }

    /// Returns `false` when the key was already a favorite.
    pub fn add_favorite(&mut self, key: &str) -> Result<bool, StoreError> {
        if self.is_favorite(key) {
            return Ok(false);
        }
        self.config.favorites.push(key.trim().to_string());
        self.save()?;
        Ok(true)
    }

    /// Returns `false` when the key was not a favorite.
    pub fn remove_favorite(&mut self, key: &str) -> Result<bool, StoreError> {
        let before = self.config.favorites.len();
        self.config
            .favorites
            .retain(|f| !f.eq_ignore_ascii_case(key.trim()));
        if self.config.favorites.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
