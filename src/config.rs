//! Client configuration
//!
//! Base URLs, credentials and transport settings, loadable from JSON or from
//! the environment.

use crate::error::{Error, Result};
use crate::http::{Session, SessionConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Base URL for the API
pub const API_URL: &str = "https://lichess.org";

/// Base URL for endgame tablebase lookups
pub const TABLEBASE_URL: &str = "https://tablebase.lichess.ovh";

/// Base URL for the opening explorer
pub const EXPLORER_URL: &str = "https://explorer.lichess.ovh";

/// Complete client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for API requests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL for tablebase requests
    #[serde(default = "default_tablebase_url")]
    pub tablebase_url: String,

    /// Base URL for opening explorer requests
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,

    /// Personal API token
    #[serde(default)]
    pub token: Option<String>,

    /// Prefer PGN over JSON for game exports when a caller does not choose
    #[serde(default)]
    pub pgn_as_default: bool,

    /// Request timeout in seconds; none unless set
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    API_URL.to_string()
}

fn default_tablebase_url() -> String {
    TABLEBASE_URL.to_string()
}

fn default_explorer_url() -> String {
    EXPLORER_URL.to_string()
}

fn default_user_agent() -> String {
    format!("lila-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            tablebase_url: default_tablebase_url(),
            explorer_url: default_explorer_url(),
            token: None,
            pgn_as_default: false,
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("tablebase_url", &self.tablebase_url)
            .field("explorer_url", &self.explorer_url)
            .field("has_token", &self.token.is_some())
            .field("pgn_as_default", &self.pgn_as_default)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Set the API base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the tablebase base URL
    #[must_use]
    pub fn with_tablebase_url(mut self, url: impl Into<String>) -> Self {
        self.tablebase_url = url.into();
        self
    }

    /// Set the opening explorer base URL
    #[must_use]
    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = url.into();
        self
    }

    /// Authenticate with a personal API token
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Prefer PGN for game exports
    #[must_use]
    pub fn with_pgn_as_default(mut self, pgn_as_default: bool) -> Self {
        self.pgn_as_default = pgn_as_default;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&content)
    }

    /// Defaults overridden by `LICHESS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Override fields from `LICHESS_*` environment variables that are set
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(token) = var("LICHESS_TOKEN") {
            self.token = Some(token);
        }
        if let Some(url) = var("LICHESS_BASE_URL") {
            self.base_url = url;
        }
        if let Some(url) = var("LICHESS_TABLEBASE_URL") {
            self.tablebase_url = url;
        }
        if let Some(url) = var("LICHESS_EXPLORER_URL") {
            self.explorer_url = url;
        }
        if let Some(secs) = var("LICHESS_TIMEOUT_SECS") {
            let secs = secs.parse().map_err(|e| Error::InvalidConfigValue {
                field: "LICHESS_TIMEOUT_SECS".to_string(),
                message: format!("{e}"),
            })?;
            self.timeout_secs = Some(secs);
        }
        Ok(self)
    }

    /// Transport settings for the session
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: self.timeout_secs.map(Duration::from_secs),
            user_agent: Some(self.user_agent.clone()),
            default_headers: Default::default(),
            token: self.token.clone(),
        }
    }

    /// Build the session described by this config
    pub fn session(&self) -> Result<Session> {
        Session::with_config(self.session_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://lichess.org");
        assert_eq!(config.tablebase_url, "https://tablebase.lichess.ovh");
        assert_eq!(config.explorer_url, "https://explorer.lichess.ovh");
        assert!(config.token.is_none());
        assert!(config.timeout_secs.is_none());
        assert!(!config.pgn_as_default);
        assert!(config.user_agent.starts_with("lila-client/"));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config =
            ClientConfig::from_json_str(r#"{"base_url": "http://localhost:8080", "pgn_as_default": true}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(config.pgn_as_default);
        assert_eq!(config.tablebase_url, TABLEBASE_URL);
    }

    #[test]
    fn test_config_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("LICHESS_TOKEN", "lip_abc"),
            ("LICHESS_TABLEBASE_URL", "https://my-tablebase.com"),
            ("LICHESS_TIMEOUT_SECS", "15"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::default()
            .merge_vars(|key| vars.get(key).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.token.as_deref(), Some("lip_abc"));
        assert_eq!(config.tablebase_url, "https://my-tablebase.com");
        assert_eq!(config.timeout_secs, Some(15));
        assert_eq!(config.base_url, API_URL);
    }

    #[test]
    fn test_config_bad_timeout_var() {
        let result = ClientConfig::default()
            .merge_vars(|key| (key == "LICHESS_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_debug_hides_token() {
        let config = ClientConfig::default().with_token("lip_secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("lip_secret"));
        assert!(debug.contains("has_token: true"));
    }

    #[test]
    fn test_session_config_from_client_config() {
        let config = ClientConfig::default()
            .with_token("lip_abc")
            .with_timeout(Duration::from_secs(30));
        let session = config.session_config();
        assert_eq!(session.timeout, Some(Duration::from_secs(30)));
        assert_eq!(session.token.as_deref(), Some("lip_abc"));
    }
}
