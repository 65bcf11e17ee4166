//! services/admin/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL the `/Student` and `/Class` paths are resolved against.
    pub api_base_url: String,
    /// Absolute URL of the chatbot endpoint. Chat is disabled without it.
    pub chatbot_url: Option<String>,
    pub log_level: Level,
    /// `None` leaves the HTTP client's own default in place.
    pub request_timeout: Option<Duration>,
    /// Extra attempts made when the chatbot endpoint answers 404.
    pub chat_not_found_retries: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // --- Endpoints ---
        let api_base_url = lookup("API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("API_BASE_URL".to_string()))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' is not an http(s) URL", api_base_url),
            ));
        }

        let chatbot_url = lookup("CHATBOT_API").filter(|v| !v.trim().is_empty());

        // --- Logging ---
        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Transport ---
        let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map(Duration::from_secs).map_err(|e| {
                    ConfigError::InvalidValue("REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?;

        let chat_not_found_retries = match lookup("CHAT_NOT_FOUND_RETRIES") {
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("CHAT_NOT_FOUND_RETRIES".to_string(), e.to_string())
            })?,
            None => 2,
        };

        Ok(Self {
            api_base_url,
            chatbot_url,
            log_level,
            request_timeout,
            chat_not_found_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_base_url_is_set() {
        let config = Config::from_lookup(lookup(&[("API_BASE_URL", "http://localhost:5000/api")])).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.chatbot_url, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.chat_not_found_retries, 2);
    }

    #[test]
    fn base_url_is_required() {
        assert!(matches!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::MissingVar(name)) if name == "API_BASE_URL"
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("API_BASE_URL", "localhost:5000")])),
            Err(ConfigError::InvalidValue(..))
        ));
    }

    #[test]
    fn optional_settings_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("API_BASE_URL", "https://school.example/api"),
            ("CHATBOT_API", "https://bot.example/chat"),
            ("RUST_LOG", "debug"),
            ("REQUEST_TIMEOUT_SECS", "15"),
            ("CHAT_NOT_FOUND_RETRIES", "0"),
        ]))
        .unwrap();
        assert_eq!(config.chatbot_url.as_deref(), Some("https://bot.example/chat"));
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.chat_not_found_retries, 0);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("API_BASE_URL", "http://x"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(name, _)) if name == "REQUEST_TIMEOUT_SECS"));
    }
}
