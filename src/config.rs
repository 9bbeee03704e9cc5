//! Configuration system using TOML files.
//!
//! Config is read from the OS-standard config directory:
//! - Windows: %APPDATA%\flac-manager\config.toml
//! - macOS: ~/Library/Application Support/flac-manager/config.toml
//! - Linux: ~/.config/flac-manager/config.toml
//!
//! `--config PATH` (or `FLAC_MANAGER_CONFIG`) points elsewhere. Every
//! setting is optional; a missing or broken file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::scanner::DEFAULT_EXTENSIONS;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which files count as audio
    pub discovery: DiscoveryConfig,

    /// Tag rewriting settings
    pub modify: ModifyConfig,

    /// Rename/sort settings
    pub organize: OrganizeConfig,
}

/// File discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Audio extensions, without the dot (matched case-insensitively)
    pub extensions: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Tag rewriting settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyConfig {
    /// Apply previews without asking (same as `--yes`)
    pub assume_yes: bool,
}

/// Rename/sort settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeConfig {
    /// Base directory for `--sort` when none is given on the command line
    pub destination: Option<PathBuf>,
}

/// Get the full path to the default config file
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flac-manager").join("config.toml"))
}

/// Load configuration, falling back to defaults.
///
/// Uses `path` when given, else [`config_path`]. Logs warnings but doesn't
/// fail - we always return a usable config.
pub fn load(path: Option<&Path>) -> Config {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) => p,
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                return Config::default();
            }
        },
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file found, using defaults");
        return Config::default();
    }

    match load_from(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "Loaded config");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "Using default configuration");
            Config::default()
        }
    }
}

/// Read and parse one config file.
pub fn load_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
}
