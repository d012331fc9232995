use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use todo_core::SyncMode;

const APP_DIR: &str = "todo-tui";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the todo API; `api/todos` is appended per request
    pub base_url: String,
    /// Global timeout applied to each request, in seconds
    pub timeout_secs: u64,
    /// How create/update resynchronize the list
    pub sync_mode: SyncMode,
    /// Where logs go; the terminal itself is taken by the UI
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 10,
            sync_mode: SyncMode::default(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from file (defaults if absent), then apply
    /// `TODO_API_URL` / `TODO_API_TIMEOUT_SECS` from the environment
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Config::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TODO_API_URL") {
            self.base_url = url;
        }
        if let Some(secs) = lookup("TODO_API_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("TODO_API_TIMEOUT_SECS is not a number: {secs}"))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Configured log file, or `todo-tui.log` next to the config file
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            Self::config_dir()
                .map(|dir| dir.join("todo-tui.log"))
                .unwrap_or_else(|| PathBuf::from("todo-tui.log"))
        })
    }

    /// `$XDG_CONFIG_HOME/todo-tui`, falling back to `~/.config/todo-tui`
    fn config_dir() -> Option<PathBuf> {
        let base = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(xdg) => PathBuf::from(xdg),
            None => dirs::home_dir()?.join(".config"),
        };
        Some(base.join(APP_DIR))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }
}
