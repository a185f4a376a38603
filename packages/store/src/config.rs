//! # Client configuration: `hospital.toml`
//!
//! Where the records API lives and how the client treats its session token.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5000"
//!
//! [auth]
//! token_key = "token"                   # storage key for the bearer token
//! clear_session_on_unauthorized = true  # drop the session on any 401
//! ```
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`ClientConfig`] | Top-level config with TOML (de)serialisation, env overrides and the canonical filename. |
//! | [`ApiConfig`] | Base URL of the records API. |
//! | [`AuthConfig`] | Token storage key and the unauthorized-response policy. |
//!
//! A missing or empty file is equivalent to the defaults. On native targets
//! `HOSPITAL_API_URL` (read through `dotenvy`, so a `.env` file works too)
//! overrides `api.base_url`.

use serde::{Deserialize, Serialize};

pub const API_URL_VAR: &str = "HOSPITAL_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Requests go to `<base_url>/api/...`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_token_key")]
    pub token_key: String,
    #[serde(default = "default_true")]
    pub clear_session_on_unauthorized: bool,
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_key: default_token_key(),
            clear_session_on_unauthorized: true,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
            },
            auth: AuthConfig::default(),
        }
    }

    pub fn with_token_key(mut self, key: impl Into<String>) -> Self {
        self.auth.token_key = key.into();
        self
    }

    pub fn with_clear_on_unauthorized(mut self, clear: bool) -> Self {
        self.auth.clear_session_on_unauthorized = clear;
        self
    }

    pub fn filename() -> &'static str {
        "hospital.toml"
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    /// Apply `HOSPITAL_API_URL`, if set, on top of `self`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn with_env(mut self) -> Self {
        dotenvy::dotenv().ok();
        if let Ok(url) = std::env::var(API_URL_VAR) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        self
    }

    /// Read `path` if it exists, then apply env overrides.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let config = match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml(&s)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(config.with_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url(), "http://localhost:5000");
        assert_eq!(config.auth.token_key, "token");
        assert!(config.auth.clear_session_on_unauthorized);
    }

    #[test]
    fn test_partial_sections() {
        let config = ClientConfig::from_toml(
            r#"
            [api]
            base_url = "https://records.example.org/"

            [auth]
            clear_session_on_unauthorized = false
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://records.example.org");
        assert_eq!(config.auth.token_key, "token");
        assert!(!config.auth.clear_session_on_unauthorized);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ClientConfig::new("http://10.0.0.2:5000")
            .with_token_key("hospital-token")
            .with_clear_on_unauthorized(false);
        let parsed = ClientConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_wrong_types() {
        assert!(ClientConfig::from_toml("[auth]\ntoken_key = 5").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let name = format!("hospital_cfg_missing_{}", std::process::id());
        let path = std::env::temp_dir().join(name);
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.auth, AuthConfig::default());
    }
}
