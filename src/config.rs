use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::{Viewport, ViewportError};

const CANVAS_WIDTH: f64 = 720.0;
const CANVAS_HEIGHT: f64 = 480.0;
const CANVAS_BACKGROUND: &str = "#ffffff";
const SERVICE_BASE_URL: &str = "http://127.0.0.1:8000";
const SERVICE_TIMEOUT_SECS: u64 = 40;

pub const ENV_BACKEND_URL: &str = "GEODRAW_BACKEND_URL";
pub const ENV_PROVIDER: &str = "GEODRAW_PROVIDER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config as TOML ({toml}) or YAML ({yaml})")]
    Parse { toml: String, yaml: String },

    #[error("unknown service provider '{0}' (expected 'http' or 'mock')")]
    UnknownProvider(String),

    #[error(transparent)]
    Viewport(#[from] ViewportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Http,
    Mock,
}

impl Provider {
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Provider::Http),
            "mock" => Ok(Provider::Mock),
            _ => Err(ConfigError::UnknownProvider(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_background")]
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

fn default_width() -> f64 {
    CANVAS_WIDTH
}
fn default_height() -> f64 {
    CANVAS_HEIGHT
}
fn default_background() -> String {
    CANVAS_BACKGROUND.to_string()
}
fn default_provider() -> Provider {
    Provider::Http
}
fn default_base_url() -> String {
    SERVICE_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    SERVICE_TIMEOUT_SECS
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            background: default_background(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            timeout_secs: SERVICE_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse TOML config: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse YAML config: {}", e))
    }

    /// Parse TOML first, then YAML.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        match Self::from_toml(content) {
            Ok(config) => Ok(config),
            Err(toml) => Self::from_yaml(content).map_err(|yaml| ConfigError::Parse { toml, yaml }),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Apply `GEODRAW_*` overrides. `lookup` is `std::env::var` in the binary.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.service.base_url = url.trim().to_string();
        }
        if let Some(provider) = lookup(ENV_PROVIDER) {
            self.service.provider = Provider::parse(&provider)?;
        }
        Ok(self)
    }

    pub fn viewport(&self) -> Result<Viewport, ConfigError> {
        Ok(Viewport::new(self.canvas.width, self.canvas.height)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }
}
