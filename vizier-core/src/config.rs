//! # Client Configuration
//!
//! A [`ClientConfig`] holds everything needed to build a client: the API key, the base URL and
//! the transport to use. It can be read from the environment or from a JSON file:
//!
//! ```json
//! { "api_key": "...", "base_url": "https://api.clarifai.com", "transport": "grpc" }
//! ```
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, path::PathBuf, str::FromStr};

pub const DEFAULT_BASE_URL: &str = "https://api.clarifai.com";

pub const API_KEY_ENV: &str = "VIZIER_API_KEY";
pub const BASE_URL_ENV: &str = "VIZIER_API_BASE";
pub const TRANSPORT_ENV: &str = "VIZIER_TRANSPORT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No API key configured, set '{0}'")]
    MissingApiKey(&'static str),
    #[error("Invalid transport '{0}', expected 'http' or 'grpc'")]
    InvalidTransport(String),
    #[error("Failed to read config file '{path}': '{source}'")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': '{source}'")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The wire protocol used to reach the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Http,
    Grpc,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "rest" => Ok(TransportKind::Http),
            "grpc" => Ok(TransportKind::Grpc),
            _ => Err(ConfigError::InvalidTransport(s.to_string())),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Http => f.write_str("http"),
            TransportKind::Grpc => f.write_str("grpc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub transport: TransportKind,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            transport: TransportKind::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// Reads `VIZIER_API_KEY`, `VIZIER_API_BASE` and `VIZIER_TRANSPORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_ENV))?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|url| !url.is_empty()) {
            config.base_url = base_url;
        }
        if let Some(transport) = lookup(TRANSPORT_ENV).filter(|t| !t.is_empty()) {
            config.transport = transport.parse()?;
        }

        Ok(config)
    }

    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.api_key.is_empty() {
            return Err(ConfigError::MissingApiKey("api_key"));
        }
        Ok(config)
    }
}
