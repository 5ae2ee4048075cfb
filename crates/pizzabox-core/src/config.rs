//! Config - 環境変数からの設定読み込み
//!
//! | 変数 | 既定値 |
//! |---|---|
//! | `PIZZABOX_API_BASE_URL` | `http://localhost:3001` |
//! | `PIZZABOX_CREATE_PATH` | `/api/pizzas` |
//! | `PIZZABOX_DATA_DIR` | `./.pizzabox` |
//! | `PIZZABOX_REQUEST_TIMEOUT_SECS` | なし（トランスポートの既定） |

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

pub const ENV_API_BASE_URL: &str = "PIZZABOX_API_BASE_URL";
pub const ENV_CREATE_PATH: &str = "PIZZABOX_CREATE_PATH";
pub const ENV_DATA_DIR: &str = "PIZZABOX_DATA_DIR";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "PIZZABOX_REQUEST_TIMEOUT_SECS";

const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_CREATE_PATH: &str = "/api/pizzas";
const DEFAULT_DATA_DIR: &str = ".pizzabox";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid url for {name}: {value:?} ({reason})")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid number for {name}: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: Url,
    /// Collection path of the create endpoint, joined onto `api_base_url`.
    pub create_path: String,
    /// Directory holding the local queue container.
    pub data_dir: PathBuf,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary lookup; unset or blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_base_url = match get(ENV_API_BASE_URL) {
            Some(value) => parse_url(ENV_API_BASE_URL, &value)?,
            None => parse_url(ENV_API_BASE_URL, DEFAULT_API_BASE_URL)?,
        };

        let request_timeout = get(ENV_REQUEST_TIMEOUT_SECS)
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidNumber {
                        name: ENV_REQUEST_TIMEOUT_SECS,
                        value,
                    })
            })
            .transpose()?;

        Ok(Self {
            api_base_url,
            create_path: get(ENV_CREATE_PATH).unwrap_or_else(|| DEFAULT_CREATE_PATH.to_string()),
            data_dir: get(ENV_DATA_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            request_timeout,
        })
    }

    /// Full URL of the create endpoint.
    pub fn create_url(&self) -> Result<Url, ConfigError> {
        self.api_base_url
            .join(&self.create_path)
            .map_err(|e| ConfigError::InvalidUrl {
                name: ENV_CREATE_PATH,
                value: self.create_path.clone(),
                reason: e.to_string(),
            })
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|e| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:3001/");
        assert_eq!(config.create_path, "/api/pizzas");
        assert_eq!(config.data_dir, PathBuf::from(".pizzabox"));
        assert_eq!(config.request_timeout, None);
        assert_eq!(
            config.create_url().unwrap().as_str(),
            "http://localhost:3001/api/pizzas"
        );
    }

    #[test]
    fn env_values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            (ENV_API_BASE_URL, "https://pizza.example.com"),
            (ENV_CREATE_PATH, "/v2/pizzas"),
            (ENV_DATA_DIR, "/var/lib/pizzabox"),
            (ENV_REQUEST_TIMEOUT_SECS, "30"),
        ]))
        .unwrap();
        assert_eq!(
            config.create_url().unwrap().as_str(),
            "https://pizza.example.com/v2/pizzas"
        );
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/pizzabox"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn blank_values_fall_back() {
        let config = Config::from_lookup(lookup(&[(ENV_CREATE_PATH, "  ")])).unwrap();
        assert_eq!(config.create_path, "/api/pizzas");
    }

    #[test]
    fn invalid_url_is_reported() {
        let err = Config::from_lookup(lookup(&[(ENV_API_BASE_URL, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { name, .. } if name == ENV_API_BASE_URL));
    }

    #[test]
    fn invalid_timeout_is_reported() {
        let err =
            Config::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }
}
