use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const DEFAULT_WEATHER_API_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_CONFIG_PATH: &str = "./config.json";
const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 3600;
const MAX_SESSION_IDLE_TTL_SECS: u64 = 30 * 24 * 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("failed to read config file {path}: {message}")]
    ConfigFile { path: String, message: String },
}

/// Optional JSON config file. Only the chat API key may be supplied this way.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(rename = "GROQ_API_KEY")]
    groq_api_key: Option<String>,
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub weather_api_url: String,
    pub weather_api_key: String,
    pub chat_completions_url: String,
    pub chat_api_key: String,
    pub chat_model: String,
    pub port: u16,
    /// Sessions untouched for longer than this are dropped (1s to 30 days).
    pub session_idle_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let chat_api_key = match optional_trimmed_env("GROQ_API_KEY") {
            Some(key) => key,
            None => load_file_config(Path::new(&config_path))?
                .groq_api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar("GROQ_API_KEY".to_string()))?,
        };

        let weather_api_key = optional_trimmed_env("OPENWEATHER_API_KEY")
            .ok_or_else(|| ConfigError::MissingVar("OPENWEATHER_API_KEY".to_string()))?;

        let weather_api_url = optional_trimmed_env("WEATHER_API_URL")
            .unwrap_or_else(|| DEFAULT_WEATHER_API_URL.to_string());
        require_http_url("WEATHER_API_URL", &weather_api_url)?;

        let chat_completions_url = optional_trimmed_env("CHAT_COMPLETIONS_URL")
            .unwrap_or_else(|| DEFAULT_CHAT_COMPLETIONS_URL.to_string());
        require_http_url("CHAT_COMPLETIONS_URL", &chat_completions_url)?;

        let port_raw = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "PORT".to_string(),
            value: port_raw.clone(),
        })?;

        let ttl_raw = std::env::var("SESSION_IDLE_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_SESSION_IDLE_TTL_SECS.to_string());
        let session_idle_ttl_secs = ttl_raw
            .parse::<u64>()
            .ok()
            .filter(|secs| (1..=MAX_SESSION_IDLE_TTL_SECS).contains(secs))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "SESSION_IDLE_TTL_SECS".to_string(),
                value: ttl_raw.clone(),
            })?;

        Ok(Self {
            weather_api_url,
            weather_api_key,
            chat_completions_url,
            chat_api_key,
            chat_model: optional_trimmed_env("CHAT_MODEL")
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            port,
            session_idle_ttl_secs,
        })
    }
}

fn optional_trimmed_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// A missing file is not an error; a present but unreadable or malformed one is.
fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::ConfigFile {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
