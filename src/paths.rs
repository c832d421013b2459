//! XDG-compliant path resolution for kinship.
//!
//! Provides `AppPaths` (global directories) following the XDG Base Directory
//! Specification, plus `~` expansion for user-supplied paths.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(kinship::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(kinship::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for kinship.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// `$HOME`
    pub home: PathBuf,
    /// `$XDG_CONFIG_HOME/kinship/`
    pub config_dir: PathBuf,
    /// `$XDG_STATE_HOME/kinship/`
    pub state_dir: PathBuf,
}

impl AppPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .ok()
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or(PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("kinship");

        let state_dir = std::env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/state"))
            .join("kinship");

        Ok(Self {
            home,
            config_dir,
            state_dir,
        })
    }

    /// Build paths rooted at an explicit home directory.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            config_dir: home.join(".config").join("kinship"),
            state_dir: home.join(".local/state").join("kinship"),
            home,
        }
    }

    /// Create the state and log directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.state_dir, &self.log_dir()] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Path to the global config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Directory holding the rolling log file.
    pub fn log_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// Path to the log file written while the TUI owns the terminal.
    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join("kinship.log")
    }

    /// Default contacts root when nothing is configured.
    pub fn default_contacts_dir(&self) -> PathBuf {
        self.home.join("Documents").join("denote")
    }

    /// Default task collection when nothing is configured.
    pub fn default_tasks_dir(&self) -> PathBuf {
        self.home.join("notes")
    }

    /// Expand a leading `~` against this home directory.
    pub fn expand(&self, raw: &str) -> PathBuf {
        expand_home(raw, &self.home)
    }
}

/// Expand `~` and `~/...` against `home`. Other paths are returned unchanged.
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        return home.to_path_buf();
    }
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_home() {
        let paths = AppPaths::with_home("/home/ada");
        assert_eq!(
            paths.config_file(),
            PathBuf::from("/home/ada/.config/kinship/config.toml")
        );
        assert_eq!(
            paths.log_file(),
            PathBuf::from("/home/ada/.local/state/kinship/logs/kinship.log")
        );
        assert_eq!(
            paths.default_contacts_dir(),
            PathBuf::from("/home/ada/Documents/denote")
        );
        assert_eq!(paths.default_tasks_dir(), PathBuf::from("/home/ada/notes"));
    }

    #[test]
    fn tilde_expands_against_home() {
        let home = Path::new("/home/ada");
        assert_eq!(expand_home("~", home), PathBuf::from("/home/ada"));
        assert_eq!(
            expand_home("~/notes/people", home),
            PathBuf::from("/home/ada/notes/people")
        );
    }

    #[test]
    fn non_tilde_paths_are_untouched() {
        let home = Path::new("/home/ada");
        assert_eq!(expand_home("/srv/notes", home), PathBuf::from("/srv/notes"));
        assert_eq!(expand_home("notes", home), PathBuf::from("notes"));
        // `~user` forms are not expanded.
        assert_eq!(expand_home("~bob/notes", home), PathBuf::from("~bob/notes"));
    }

    #[test]
    fn ensure_dirs_is_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = AppPaths::with_home(dir.path());
        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();
        assert!(paths.log_dir().is_dir());
    }
}
