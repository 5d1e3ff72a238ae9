use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::history::DEFAULT_CAPACITY;
use crate::session::Session;
use crate::style::Theme;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown theme '{0}'")]
    UnknownTheme(String),
}

/// `$HOME/.config/celltable`
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("celltable"))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub name: Option<String>,
    pub role: Option<u8>,
}

/// Shape of the blank surface used when nothing has been saved yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub tables: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self { tables: 1, rows: 6, cols: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub history_capacity: usize,
    pub store_path: Option<PathBuf>,
    /// Built-in theme name, or a path to a theme TOML file
    pub theme: String,
    pub session: SessionConfig,
    pub surface: SurfaceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            store_path: None,
            theme: "light".to_string(),
            session: SessionConfig::default(),
            surface: SurfaceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn store_path(&self) -> PathBuf {
        match &self.store_path {
            Some(p) => p.clone(),
            None => config_dir()
                .map(|d| d.join("store.json"))
                .unwrap_or_else(|| PathBuf::from("celltable-store.json")),
        }
    }

    pub fn theme(&self) -> Result<Theme, ConfigError> {
        if let Some(theme) = Theme::by_name(&self.theme) {
            return Ok(theme);
        }
        let path = PathBuf::from(&self.theme);
        if path.extension().map_or(false, |ext| ext == "toml") {
            return Theme::from_file(&path);
        }
        Err(ConfigError::UnknownTheme(self.theme.clone()))
    }

    pub fn session(&self) -> Session {
        Session::new(self.session.name.clone(), self.session.role)
    }
}
