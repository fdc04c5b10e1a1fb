use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::ConsoleResult;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SessionConfig {
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_level() -> String {
    "info".to_owned()
}

fn default_token_file() -> String {
    ".kuku/session.json".to_owned()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            log: LogConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    pub fn parse(s: &str) -> ConsoleResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Reads the file if it exists, otherwise falls back to defaults.
    pub fn load(path: impl AsRef<Path>) -> ConsoleResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let s = fs::read_to_string(path)?;
        Self::parse(&s)
    }
}
