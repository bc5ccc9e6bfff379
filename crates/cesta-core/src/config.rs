use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CestaError;
use crate::lexicon::Lexicon;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub learning: LearningConfig,
    pub shared: SharedConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Name recorded as `updated_by` on shared corrections.
    pub collaborator: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    pub enabled: bool,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub table: String,
    pub fetch_limit: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Category display name → extra keyword phrases.
    #[serde(default)]
    pub extra: HashMap<String, Vec<String>>,
}

impl AppConfig {
    /// Load config: user file (if exists), otherwise built-in defaults.
    pub fn load() -> Result<Self, CestaError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            let user_str = std::fs::read_to_string(&user_path)?;
            Self::from_toml(&user_str)
        } else {
            Self::from_toml(DEFAULT_CONFIG)
        }
    }

    pub fn from_toml(s: &str) -> Result<Self, CestaError> {
        toml::from_str(s).map_err(|e| CestaError::Config(e.to_string()))
    }

    /// Built-in lexicon plus any configured extra keywords.
    pub fn lexicon(&self) -> Lexicon {
        if self.lexicon.extra.is_empty() {
            Lexicon::builtin().clone()
        } else {
            Lexicon::with_extra(&self.lexicon.extra)
        }
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the database file.
    pub fn db_path(&self) -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join(&self.storage.database))
            .unwrap_or_else(|| PathBuf::from(&self.storage.database))
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path(&self) -> Result<PathBuf, CestaError> {
        let path = self.db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "cesta")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
