use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::Unauthorized;

/// Main QueryLinker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub refresh: RefreshConfig,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the QueryLinker REST backend
    pub base_url: String,
    /// Global HTTP timeout in seconds
    pub timeout_secs: u64,
    /// What queries do when the session has expired
    pub on_unauthorized: UnauthorizedPolicy,
}

/// Config-file spelling of the per-query 401 policy default
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnauthorizedPolicy {
    /// Report "401: ..." like any other failure
    Surface,
    /// Treat reads as signed-out (empty) instead of failing
    Ignore,
}

impl UnauthorizedPolicy {
    pub fn as_policy(&self) -> Unauthorized {
        match self {
            UnauthorizedPolicy::Surface => Unauthorized::Surface,
            UnauthorizedPolicy::Ignore => Unauthorized::ReturnNone,
        }
    }
}

/// Opt-in periodic refresh, in seconds; 0 disables and cached reads stay
/// fresh for the whole session
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub metrics_secs: u64,
    pub incidents_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            refresh: RefreshConfig::default(),
            log_level: LogLevel::Info,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
            on_unauthorized: UnauthorizedPolicy::Surface,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            metrics_secs: 0,
            incidents_secs: 0,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it (~ and env vars
        // are expanded first)
        if let Some(path) = config_path {
            let path = Self::expand_path(path);
            return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
        }

        // Check QUERYLINKER_CONFIG env var
        if let Ok(env_path) = std::env::var("QUERYLINKER_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from QUERYLINKER_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try QUERYLINKER_DIR/querylinker.yaml
        if let Ok(ql_dir) = std::env::var("QUERYLINKER_DIR") {
            let path = PathBuf::from(ql_dir).join("querylinker.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from QUERYLINKER_DIR: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/querylinker/querylinker.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("querylinker").join("querylinker.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./querylinker.yaml (for development)
        let local_config = PathBuf::from("querylinker.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Path the fallback chain would read, for `config path`
    pub fn default_path() -> PathBuf {
        std::env::var("QUERYLINKER_DIR")
            .map(|dir| PathBuf::from(dir).join("querylinker.yaml"))
            .unwrap_or_else(|_| {
                dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("querylinker")
                    .join("querylinker.yaml")
            })
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}
