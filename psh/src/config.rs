use crate::shell::APP_NAME;
use anyhow::{Context as _, Result};
use psh_types::PshError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_MAX_JOBS: usize = 20;
pub const DEFAULT_HISTORY_SIZE: usize = 16;

/// Settings read from `$XDG_CONFIG_HOME/psh/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_jobs: usize,
    pub history_size: usize,
    pub log_file: Option<PathBuf>,
    pub prompt: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_jobs: DEFAULT_MAX_JOBS,
            history_size: DEFAULT_HISTORY_SIZE,
            log_file: None,
            prompt: None,
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, PshError> {
        toml::from_str(text).map_err(|e| PshError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self::parse(&text)?)
    }

    /// Loads `path`, or the xdg config file when `path` is `None`. A missing
    /// or broken file falls back to the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(),
        };
        let Some(path) = path else {
            debug!("no config file, using defaults");
            return Config::default();
        };
        match Config::from_file(&path) {
            Ok(config) => {
                debug!("loaded config {}: {:?}", path.display(), config);
                config
            }
            Err(err) => {
                warn!("ignoring config {}: {:#}", path.display(), err);
                Config::default()
            }
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    let xdg_dir = xdg::BaseDirectories::with_prefix(APP_NAME).ok()?;
    xdg_dir.find_config_file(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.max_jobs, 20);
        assert_eq!(config.history_size, 16);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse("max_jobs = 4\nprompt = \"$ \"\n").unwrap();
        assert_eq!(config.max_jobs, 4);
        assert_eq!(config.history_size, DEFAULT_HISTORY_SIZE);
        assert_eq!(config.prompt.as_deref(), Some("$ "));
    }

    #[test]
    fn broken_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "max_jobs = \"many\"").unwrap();
        assert!(Config::from_file(&path).is_err());
        assert_eq!(Config::load(Some(&path)), Config::default());
    }

    #[test]
    fn explicit_path_is_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("psh.toml");
        fs::write(&path, "history_size = 3\nlog_file = \"/tmp/psh.log\"\n").unwrap();
        let config = Config::load(Some(&path));
        assert_eq!(config.history_size, 3);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/psh.log")));
    }
}
