//! Configuration management for Charta.
//!
//! Parses `charta.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! The renderer URL supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use expand::expand_env;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "charta.toml";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("environment variable expansion failed for {field}: {message}")]
    EnvVar { field: String, message: String },
}

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the page hostname used for platform identification.
    pub hostname: Option<String>,
    /// Override the Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override the render HTTP timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Override the watcher's frame interval in milliseconds.
    pub frame_millis: Option<u64>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram renderer configuration.
    pub renderer: RendererConfig,
    /// Observation loop configuration.
    pub watch: WatchConfig,
    /// Page defaults.
    pub page: PageConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Diagram renderer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Kroki server URL. Supports `${VAR}` expansion.
    pub kroki_url: String,
    /// HTTP timeout for render requests, in seconds.
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            kroki_url: "https://kroki.io".to_owned(),
            timeout_secs: 30,
        }
    }
}

impl RendererConfig {
    /// The render timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Observation loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Rescan coalescing interval, in milliseconds.
    pub frame_millis: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { frame_millis: 16 }
    }
}

impl WatchConfig {
    /// The frame interval as a [`Duration`].
    #[must_use]
    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_millis)
    }
}

/// Page defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Hostname used for platform identification when the page itself
    /// does not carry one and the CLI does not override it.
    pub hostname: Option<String>,
}

impl Config {
    /// Load configuration by searching for `charta.toml` starting at
    /// `start_dir` and walking up the directory tree.
    ///
    /// Falls back to defaults when no config file is found.
    pub fn discover(start_dir: &Path, settings: &CliSettings) -> Result<Self, ConfigError> {
        let mut config = match find_config_file(start_dir) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_settings(settings);
        config.expand()?;
        Ok(config)
    }

    /// Load configuration from an explicit file path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn apply_settings(&mut self, settings: &CliSettings) {
        if let Some(hostname) = &settings.hostname {
            self.page.hostname = Some(hostname.clone());
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.renderer.kroki_url = kroki_url.clone();
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.renderer.timeout_secs = timeout_secs;
        }
        if let Some(frame_millis) = settings.frame_millis {
            self.watch.frame_millis = frame_millis;
        }
    }

    fn expand(&mut self) -> Result<(), ConfigError> {
        self.renderer.kroki_url = expand_env(&self.renderer.kroki_url, "renderer.kroki_url")?;
        Ok(())
    }
}

/// Walk up from `start_dir` looking for the config file.
fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = Some(start_dir);
    while let Some(current) = dir {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}
