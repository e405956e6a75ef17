//! Configuration loading and filesystem paths.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Base URL used when no config file or flag overrides it.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// User configuration, read from `config.toml` in the mailsweep home.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the gateway API, without a trailing slash.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Loads the config file if present, otherwise returns defaults.
    pub fn load() -> Result<Self> {
        let path = paths::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }
}

pub mod paths {
    use super::PathBuf;

    /// Directory holding config, session, and logs. Override with
    /// `MAILSWEEP_HOME`; defaults to `~/.config/mailsweep`.
    pub fn mailsweep_home() -> PathBuf {
        if let Ok(home) = std::env::var("MAILSWEEP_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .expect("Could not determine home directory")
            .join(".config")
            .join("mailsweep")
    }

    pub fn config_path() -> PathBuf {
        mailsweep_home().join("config.toml")
    }

    pub fn session_path() -> PathBuf {
        mailsweep_home().join("session.json")
    }

    pub fn log_dir() -> PathBuf {
        mailsweep_home().join("logs")
    }
}
