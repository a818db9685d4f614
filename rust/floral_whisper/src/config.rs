//! Generator Configuration
//!
//! Settings for the image-service client. Values are layered: built-in
//! defaults, then an optional JSON file, then environment variables.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ASPECT_RATIO: &str = "4:5";

/// Environment variables holding the API key, first match wins
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];
pub const MODEL_VAR: &str = "FLORAL_WHISPER_MODEL";
pub const ENDPOINT_VAR: &str = "FLORAL_WHISPER_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Service API key; empty means "not configured"
    pub api_key: String,
    /// Model that composes the bouquet
    pub model: String,
    /// Base URL of the REST API, without a trailing slash
    pub endpoint: String,
    /// Requested output aspect ratio
    pub aspect_ratio: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            aspect_ratio: DEFAULT_ASPECT_RATIO.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Defaults with the given API key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON config document; missing fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay values from the process environment
    pub fn apply_env(self) -> Self {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overlay values from a variable lookup; empty values are ignored
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = API_KEY_VARS.iter().find_map(|name| lookup(*name)) {
            self.api_key = key;
        }
        if let Some(model) = lookup(MODEL_VAR) {
            self.model = model;
        }
        if let Some(endpoint) = lookup(ENDPOINT_VAR) {
            self.endpoint = endpoint;
        }
        self
    }

    /// Fail early when no API key is configured
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        let key = self.api_key.trim();
        if key.is_empty() {
            Err(ConfigError::MissingApiKey)
        } else {
            Ok(key)
        }
    }

    /// Full URL of the `generateContent` call
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}
