//! Client configuration.
//!
//! A [`WalletConfig`] is usually read from a JSON file. The token may be given literally or as an
//! environment variable reference:
//!
//! ```json
//! {
//!   "token": "$QIWI_TOKEN",
//!   "timeoutSecs": 30
//! }
//! ```
//!
//! `apiUrl` and `detectUrl` default to the production hosts.

use qiwi_types::config::LiteralOrEnv;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Configuration of a [`WalletClient`](crate::WalletClient).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConfig {
    token: LiteralOrEnv<String>,
    #[serde(default = "config_defaults::api_url")]
    api_url: Url,
    #[serde(default = "config_defaults::detect_url")]
    detect_url: Url,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl WalletConfig {
    /// A configuration with the given token and default hosts.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            token: LiteralOrEnv::from_literal(token.into()),
            api_url: config_defaults::api_url(),
            detect_url: config_defaults::detect_url(),
            timeout_secs: None,
        }
    }

    /// Reads a JSON config file, resolving environment variable references.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: display,
            source,
        })
    }

    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn detect_url(&self) -> &Url {
        &self.detect_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }
}

mod config_defaults {
    use url::Url;

    use crate::client::{API_URL, DETECT_URL};

    pub fn api_url() -> Url {
        Url::parse(API_URL).expect("API_URL is a valid URL")
    }

    pub fn detect_url() -> Url {
        Url::parse(DETECT_URL).expect("DETECT_URL is a valid URL")
    }
}
