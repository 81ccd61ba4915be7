//! Client configuration.
//!
//! Loaded from `<config dir>/booknetic-client/config.json`, then overridden
//! by environment variables:
//! - `BOOKNETIC_URL` - Site used when no saved site is current
//! - `BOOKNETIC_DATA_DIR` - Directory holding the local store
//! - `BOOKNETIC_TIMEOUT_MS` - Per-request timeout
//! - `BOOKNETIC_PROBE_TIMEOUT_MS` - Compatibility probe timeout

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "booknetic-client";
const CONFIG_FILE: &str = "config.json";

/// Value left in unconfigured builds.
const URL_PLACEHOLDER: &str = "{{WORDPRESS_URL}}";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Site to talk to before any site has been added.
    pub site_url: Option<String>,
    pub request_timeout_ms: u64,
    pub probe_timeout_ms: u64,
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: None,
            request_timeout_ms: 10_000,
            probe_timeout_ms: 5_000,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load from disk and the environment.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load() -> Self {
        Self::load_file().with_env(|key| std::env::var(key).ok())
    }

    /// Load the config file alone, without environment overrides.
    pub fn load_file() -> Self {
        match get_config_path().and_then(|path| Self::read_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("BOOKNETIC_URL") {
            self.site_url = Some(url);
        }
        if let Some(dir) = lookup("BOOKNETIC_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(ms) = lookup("BOOKNETIC_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.request_timeout_ms = ms;
        }
        if let Some(ms) = lookup("BOOKNETIC_PROBE_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.probe_timeout_ms = ms;
        }
        self
    }

    /// Write to the config file, returning its path.
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// The configured site url, unless it is blank or still the placeholder.
    pub fn site_url(&self) -> Option<&str> {
        self.site_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty() && *url != URL_PLACEHOLDER)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

fn get_config_path() -> Result<PathBuf> {
    let mut path =
        config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
