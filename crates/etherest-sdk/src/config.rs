//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::SdkError;

/// Public Etherest gateway
pub const DEFAULT_SERVER: &str = "https://api.etherest.io:8080/v1/";

/// Environment variable overriding the gateway endpoint
pub const SERVER_ENV: &str = "ETHEREST_SERVER";

/// Environment variable providing the API key
pub const API_KEY_ENV: &str = "ETHEREST_API_KEY";

/// Connection settings for an [`EtherestClient`](crate::EtherestClient)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL every request path is appended to
    #[serde(default = "default_server")]
    pub server: String,
    /// API key sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            api_key: None,
        }
    }
}

impl Config {
    /// Defaults overridden by `ETHEREST_SERVER` / `ETHEREST_API_KEY`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(server) = lookup(SERVER_ENV).filter(|s| !s.is_empty()) {
            config.server = server;
        }
        if let Some(key) = lookup(API_KEY_ENV).filter(|s| !s.is_empty()) {
            config.api_key = Some(key);
        }
        config
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, SdkError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Replace the server URL
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}
