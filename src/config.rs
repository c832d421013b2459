//! Configuration: where contacts and tasks live.
//!
//! The optional config file is TOML at `$XDG_CONFIG_HOME/kinship/config.toml`.
//! The contacts root is resolved in priority order: explicit override (CLI flag
//! or `KINSHIP_CONTACTS_DIR`), then `notes_directory` from the file, then
//! `~/Documents/denote`.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::AppPaths;

/// Environment variable overriding the contacts root.
pub const CONTACTS_DIR_ENV: &str = "KINSHIP_CONTACTS_DIR";

/// Errors from config loading.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(kinship::config::read),
        help("Ensure the config file is readable, or remove it to use defaults.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(kinship::config::parse),
        help("Check the TOML syntax. Known keys: notes_directory, tasks_directory.")
    )]
    Parse { path: String, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// On-disk configuration file, all keys optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigFile {
    /// Directory scanned for `*__contact.md` records. `~` is expanded.
    #[serde(default)]
    pub notes_directory: Option<String>,
    /// Directory receiving generated `*__task.md` records. `~` is expanded.
    #[serde(default)]
    pub tasks_directory: Option<String>,
}

impl ConfigFile {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub contacts_dir: PathBuf,
    pub tasks_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from an explicit override, the config file, and defaults.
    ///
    /// `override_dir` is the CLI flag if given, otherwise the environment variable.
    pub fn resolve(paths: &AppPaths, override_dir: Option<&str>) -> ConfigResult<Self> {
        let file = ConfigFile::load(&paths.config_file())?;
        Ok(Self::from_parts(paths, &file, override_dir))
    }

    /// Pure resolution step, split out for testing.
    pub fn from_parts(paths: &AppPaths, file: &ConfigFile, override_dir: Option<&str>) -> Self {
        let contacts_dir = override_dir
            .filter(|d| !d.is_empty())
            .map(|d| paths.expand(d))
            .or_else(|| {
                file.notes_directory
                    .as_deref()
                    .filter(|d| !d.is_empty())
                    .map(|d| paths.expand(d))
            })
            .unwrap_or_else(|| paths.default_contacts_dir());

        let tasks_dir = file
            .tasks_directory
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| paths.expand(d))
            .unwrap_or_else(|| paths.default_tasks_dir());

        Self {
            contacts_dir,
            tasks_dir,
        }
    }
}
