//! Runtime configuration.
//!
//! # Responsibility
//! - Describe where application resources, the store and logs live.
//! - Load overrides from a JSON file, filling gaps with defaults.
//!
//! # Invariants
//! - `data_path` is absolute after loading.
//! - Derived paths are always below `data_path` unless `log_dir` is set.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Directory (below `data_path`) holding installed resource directories.
pub const APPLICATIONS_DIR: &str = "applications";
/// Default store database file name.
pub const DEFAULT_DATABASE_FILE: &str = "applications.sqlite3";
const DEFAULT_LOG_DIR: &str = "logs";

/// Runtime configuration for one host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub data_path: PathBuf,
    #[serde(default = "default_level_string")]
    pub log_level: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

fn default_database_file() -> String {
    DEFAULT_DATABASE_FILE.to_string()
}

impl RuntimeConfig {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            log_level: default_level_string(),
            log_dir: None,
            database_file: default_database_file(),
        }
    }

    /// Reads a JSON config file.
    ///
    /// Relative `data_path` values resolve against the file's directory;
    /// a relative config path is first taken from the working directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Unreadable(format!("{}: {err}", path.display())))?;
        let mut config: Self =
            serde_json::from_str(&text).map_err(|err| ConfigError::Malformed(err.to_string()))?;

        if config.data_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingDataPath);
        }
        if config.data_path.is_relative() {
            let cwd = std::env::current_dir().map_err(|err| {
                ConfigError::Unreadable(format!("working directory unavailable: {err}"))
            })?;
            config.data_path = resolve_data_path(path, &cwd, &config.data_path);
        }
        if config.database_file.trim().is_empty() {
            config.database_file = default_database_file();
        }
        Ok(config)
    }

    /// `<data_path>/applications`.
    pub fn applications_dir(&self) -> PathBuf {
        self.data_path.join(APPLICATIONS_DIR)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_path.join(&self.database_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.data_path.join(DEFAULT_LOG_DIR))
    }
}

fn resolve_data_path(config_path: &Path, cwd: &Path, data_path: &Path) -> PathBuf {
    let config_path = cwd.join(config_path);
    let base = config_path.parent().unwrap_or(cwd);
    base.join(data_path)
}

/// Configuration loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Unreadable(String),
    Malformed(String),
    MissingDataPath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable(message) => write!(f, "config cannot be read: {message}"),
            Self::Malformed(message) => write!(f, "config is malformed: {message}"),
            Self::MissingDataPath => write!(f, "config data_path must not be empty"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{resolve_data_path, ConfigError, RuntimeConfig, DEFAULT_DATABASE_FILE};
    use crate::logging::default_log_level;
    use std::path::{Path, PathBuf};

    #[test]
    fn derives_paths_below_data_path() {
        let config = RuntimeConfig::new("/var/lib/webapps");
        assert_eq!(
            config.applications_dir(),
            PathBuf::from("/var/lib/webapps/applications")
        );
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/webapps").join(DEFAULT_DATABASE_FILE)
        );
        assert_eq!(config.log_dir(), PathBuf::from("/var/lib/webapps/logs"));
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn loads_json_with_defaults_and_relative_data_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.json");
        std::fs::write(&path, r#"{"data_path":"data","log_level":"warn"}"#).unwrap();

        let config = RuntimeConfig::load(&path).expect("config loads");
        assert_eq!(config.data_path, dir.path().join("data"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.database_file, DEFAULT_DATABASE_FILE);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn bare_config_file_name_resolves_against_working_directory() {
        assert_eq!(
            resolve_data_path(Path::new("runtime.json"), Path::new("/srv"), Path::new("data")),
            PathBuf::from("/srv/data")
        );
        assert_eq!(
            resolve_data_path(
                Path::new("conf/runtime.json"),
                Path::new("/srv"),
                Path::new("../data")
            ),
            PathBuf::from("/srv/conf/../data")
        );
        assert_eq!(
            resolve_data_path(Path::new("/etc/runtime.json"), Path::new("/srv"), Path::new("data")),
            PathBuf::from("/etc/data")
        );
    }

    #[test]
    fn rejects_empty_data_path_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.json");

        std::fs::write(&path, r#"{"data_path":""}"#).unwrap();
        assert_eq!(
            RuntimeConfig::load(&path).unwrap_err(),
            ConfigError::MissingDataPath
        );

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            RuntimeConfig::load(&path).unwrap_err(),
            ConfigError::Malformed(_)
        ));
    }
}
