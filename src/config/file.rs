//! Configuration file discovery and loading
//!
//! This module provides functionality to find and load configuration files
//! from standard locations.

use std::path::{Path, PathBuf};

use super::Config;

/// Configuration file wrapper with path information
#[derive(Debug, Clone)]
pub struct ConfigFile {
    /// Path where the configuration was loaded from
    pub path: PathBuf,

    /// The parsed configuration
    pub config: Config,
}

/// Standard configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application name for directory paths
const APP_NAME: &str = "sshtap";

/// Get all configuration search paths (in priority order)
///
/// Search order:
/// 1. `$XDG_CONFIG_HOME/sshtap/config.toml` (if env var set)
/// 2. `~/.config/sshtap/config.toml`
/// 3. `~/.sshtap.toml`
/// 4. `/etc/sshtap/config.toml` (Unix system-wide)
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join(APP_NAME).join(CONFIG_FILE_NAME));
    }

    if let Some(home) = dirs::home_dir() {
        let dotconfig = home.join(".config").join(APP_NAME).join(CONFIG_FILE_NAME);
        if !paths.contains(&dotconfig) {
            paths.push(dotconfig);
        }
        paths.push(home.join(format!(".{}.toml", APP_NAME)));
    }

    #[cfg(unix)]
    paths.push(PathBuf::from("/etc").join(APP_NAME).join(CONFIG_FILE_NAME));

    paths
}

/// Find the configuration file in standard locations
///
/// Returns `None` if no configuration file is found.
pub fn find_config_file() -> Option<PathBuf> {
    for path in config_search_paths() {
        if path.exists() && path.is_file() {
            tracing::info!(path = %path.display(), "Found configuration file");
            return Some(path);
        }
    }

    tracing::debug!("No configuration file found in standard locations");
    None
}

/// Load configuration from the specified path
pub fn load_config(path: &Path) -> crate::Result<ConfigFile> {
    tracing::debug!("Loading configuration from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to read configuration file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to parse configuration file '{}': {}",
            path.display(),
            e
        ))
    })?;

    Ok(ConfigFile {
        path: path.to_path_buf(),
        config,
    })
}

/// Load configuration from a specific path or fall back to the first found
/// standard location; defaults when nothing is found.
pub fn load_config_or_default(path: Option<&Path>) -> crate::Result<ConfigFile> {
    match path {
        Some(p) => load_config(p),
        None => match find_config_file() {
            Some(found) => load_config(&found),
            None => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(ConfigFile {
                    path: PathBuf::new(),
                    config: Config::default(),
                })
            }
        },
    }
}
