//! Runtime configuration, read from the environment (and an optional `.env`)

use crate::fetcher::DEFAULT_MENU_URL;
use crate::menu_cache::DEFAULT_TTL_HOURS;
use crate::parser::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use chrono::Duration;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_CACHE_DIR: &str = "./lunchmenu-cache";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Settings for the language-model parser
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding the page and per-weekday cache entries
    pub cache_dir: PathBuf,
    /// Lifetime of every cache entry
    pub cache_ttl: Duration,
    pub menu_url: String,
    pub openai: OpenAiConfig,
}

impl ServerConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_addr = match var("LUNCHMENU_BIND_ADDR") {
            Some(addr) => addr.parse().map_err(|e| invalid("LUNCHMENU_BIND_ADDR", e))?,
            None => {
                let port = match var("PORT") {
                    Some(port) => port.parse().map_err(|e| invalid("PORT", e))?,
                    None => DEFAULT_PORT,
                };
                SocketAddr::from(([127, 0, 0, 1], port))
            }
        };

        let cache_ttl = match var("LUNCHMENU_CACHE_TTL_HOURS") {
            Some(hours) => {
                let hours: u64 = hours
                    .parse()
                    .map_err(|e| invalid("LUNCHMENU_CACHE_TTL_HOURS", e))?;
                // TimeDelta is bounded by i64::MAX milliseconds
                i64::try_from(hours)
                    .ok()
                    .filter(|hours| *hours > 0)
                    .and_then(Duration::try_hours)
                    .ok_or_else(|| invalid("LUNCHMENU_CACHE_TTL_HOURS", "out of range"))?
            }
            None => Duration::hours(DEFAULT_TTL_HOURS as i64),
        };

        let menu_url = checked_url(
            "LUNCHMENU_MENU_URL",
            var("LUNCHMENU_MENU_URL").unwrap_or_else(|| DEFAULT_MENU_URL.to_string()),
        )?;
        let base_url = checked_url(
            "OPENAI_BASE_URL",
            var("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        )?;

        Ok(Self {
            bind_addr,
            cache_dir: var("LUNCHMENU_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            cache_ttl,
            menu_url,
            openai: OpenAiConfig {
                api_key: var("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?,
                model: var("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url,
            },
        })
    }
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

/// Only absolute http(s) URLs are accepted
fn checked_url(var: &'static str, value: String) -> Result<String, ConfigError> {
    let url = Url::parse(&value).map_err(|e| invalid(var, e))?;
    match url.scheme() {
        "http" | "https" => Ok(value),
        other => Err(invalid(var, format!("unsupported scheme {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("OPENAI_API_KEY", "sk-test")]).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.cache_dir, PathBuf::from("./lunchmenu-cache"));
        assert_eq!(config.cache_ttl, Duration::hours(24));
        assert_eq!(config.menu_url, "https://blanko.net/lounas");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingApiKey)));
        assert!(matches!(
            load(&[("OPENAI_API_KEY", "  ")]),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn test_port_and_bind_addr() {
        let config = load(&[("OPENAI_API_KEY", "k"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.bind_addr.port(), 8080);

        let config = load(&[
            ("OPENAI_API_KEY", "k"),
            ("PORT", "8080"),
            ("LUNCHMENU_BIND_ADDR", "0.0.0.0:9000"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("OPENAI_API_KEY", "k"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1"),
            ("LUNCHMENU_CACHE_DIR", "/var/cache/lunchmenu"),
            ("LUNCHMENU_CACHE_TTL_HOURS", "6"),
            ("LUNCHMENU_MENU_URL", "https://example.com/menu"),
        ])
        .unwrap();

        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.base_url, "http://localhost:11434/v1");
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/lunchmenu"));
        assert_eq!(config.cache_ttl, Duration::hours(6));
        assert_eq!(config.menu_url, "https://example.com/menu");
    }

    #[test]
    fn test_invalid_values() {
        let cases = [
            ("PORT", "http"),
            ("LUNCHMENU_BIND_ADDR", "localhost"),
            ("LUNCHMENU_CACHE_TTL_HOURS", "0"),
            ("LUNCHMENU_CACHE_TTL_HOURS", "a day"),
            ("LUNCHMENU_CACHE_TTL_HOURS", "-3"),
            ("LUNCHMENU_CACHE_TTL_HOURS", "1000000000000000"),
            ("LUNCHMENU_CACHE_TTL_HOURS", "18446744073709551615"),
            ("LUNCHMENU_MENU_URL", "not a url"),
            ("OPENAI_BASE_URL", "ftp://models.example.com"),
        ];

        for (name, value) in cases {
            match load(&[("OPENAI_API_KEY", "k"), (name, value)]) {
                Err(ConfigError::Invalid { var, .. }) => assert_eq!(var, name),
                other => panic!("{}={} should be invalid, got {:?}", name, value, other),
            }
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = load(&[("OPENAI_API_KEY", "sk-very-secret")]).unwrap();
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }
}
