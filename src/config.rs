use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::gemini::DEFAULT_MODEL;

/// Environment variable holding the provider credential
pub const API_KEY_ENV: &str = "GOOGLE_GENAI_API_KEY";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;

pub const FONT_SIZE_MIN: u32 = 10;
pub const FONT_SIZE_MAX: u32 = 24;
pub const FONT_SIZE_DEFAULT: u32 = 16;

/// Optional settings from ~/.config/ytchat/config.toml
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub font_size: Option<u32>,
}

impl FileConfig {
    /// Load config from ~/.config/ytchat/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: FileConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(FileConfig::default())
        }
    }
}

/// Settings resolved once at startup and shared by every handler
#[derive(Clone)]
pub struct Config {
    pub model: String,
    pub host: String,
    pub port: u16,
    pub font_size: u32,
    /// Credential from the environment; when set the UI key field is locked
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            font_size: FONT_SIZE_DEFAULT,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("font_size", &self.font_size)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Merge file settings with the environment credential
    pub fn from_file(file: FileConfig, api_key: Option<String>) -> Self {
        let defaults = Config::default();
        Self {
            model: file.model.unwrap_or(defaults.model),
            host: file.host.unwrap_or(defaults.host),
            port: file.port.unwrap_or(defaults.port),
            font_size: clamp_font_size(file.font_size.unwrap_or(defaults.font_size)),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn api_key_locked(&self) -> bool {
        self.api_key.is_some()
    }
}

pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok()
}

pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytchat")
        .join("config.toml")
}
