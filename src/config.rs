use crate::bulk::ControllerSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const KEYS: [&str; 5] = [
    "api_base_url",
    "api_token",
    "request_delay_ms",
    "notification_ttl_ms",
    "result_display_ms",
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_delay_ms: u64,
    pub notification_ttl_ms: u64,
    pub result_display_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            api_token: None,
            request_delay_ms: 300,
            notification_ttl_ms: 5000,
            result_display_ms: 3000,
        }
    }
}

impl Config {
    /// Loads the user config, falling back to defaults when none exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&get_config_file_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&get_config_file_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = toml::to_string(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "api_base_url" => self.api_base_url.clone(),
            "api_token" => self.api_token.clone().unwrap_or_default(),
            "request_delay_ms" => self.request_delay_ms.to_string(),
            "notification_ttl_ms" => self.notification_ttl_ms.to_string(),
            "result_display_ms" => self.result_display_ms.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "api_base_url" => self.api_base_url = value,
            "api_token" => {
                self.api_token = if value.is_empty() { None } else { Some(value) };
            }
            "request_delay_ms" => self.request_delay_ms = parse_millis(key, &value)?,
            "notification_ttl_ms" => self.notification_ttl_ms = parse_millis(key, &value)?,
            "result_display_ms" => self.result_display_ms = parse_millis(key, &value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            item_delay: Duration::from_millis(self.request_delay_ms),
            notification_ttl: Duration::from_millis(self.notification_ttl_ms),
            result_display: Duration::from_millis(self.result_display_ms),
        }
    }
}

fn parse_millis(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

pub fn get_config_file_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?;

    Ok(config_dir.join("affiliate-pipeline").join("config.toml"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find config directory")]
    ConfigDirNotFound,
    #[error("Unknown configuration key '{0}'. Supported keys: api_base_url, api_token, request_delay_ms, notification_ttl_ms, result_display_ms")]
    UnknownKey(String),
    #[error("Invalid value '{value}' for '{key}': expected a number of milliseconds")]
    InvalidValue { key: String, value: String },
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
}
