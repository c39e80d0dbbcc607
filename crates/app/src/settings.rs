//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` in the working directory, then overridden by
//! `TRACEFUND__*` environment variables (`TRACEFUND__SERVER__PORT=8080`).
//!
//! See `settings.example.toml` for the full layout.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use engine::{MatchingConfig, TriggerMode};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Matching {
    pub trigger: TriggerMode,
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub commit_timeout_ms: u64,
}

impl Default for Matching {
    fn default() -> Self {
        let defaults = MatchingConfig::default();
        Self {
            trigger: TriggerMode::default(),
            max_attempts: defaults.max_attempts,
            base_backoff_ms: defaults.base_backoff.as_millis() as u64,
            max_backoff_ms: defaults.max_backoff.as_millis() as u64,
            commit_timeout_ms: defaults.commit_timeout.as_millis() as u64,
        }
    }
}

impl Matching {
    pub fn config(&self) -> MatchingConfig {
        MatchingConfig {
            max_attempts: self.max_attempts,
            base_backoff: Duration::from_millis(self.base_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            commit_timeout: Duration::from_millis(self.commit_timeout_ms),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub matching: Matching,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("TRACEFUND")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
