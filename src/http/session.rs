//! HTTP session
//!
//! The session is the transport handle shared by every requestor of a
//! client: one `reqwest::Client` carrying default headers (authorization,
//! user agent) and transport settings such as timeouts.

use crate::error::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Configuration for building a session
#[derive(Clone, Default)]
pub struct SessionConfig {
    /// Request timeout; none unless configured
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// Personal API token sent as a bearer token
    pub token: Option<String>,
}

impl SessionConfig {
    /// Create a new config builder
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("default_headers", &self.default_headers)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

/// Builder for session config
#[derive(Default)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(agent.into());
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Authenticate with a personal API token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Build the config
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

/// Shared transport handle.
///
/// Cloning is cheap and clones share the same connection pool. The session
/// holds no per-request state, so concurrent requests through clones of one
/// session do not interfere; anything callers layer on top that mutates
/// shared state needs its own synchronization.
#[derive(Clone)]
pub struct Session {
    client: Client,
    authenticated: bool,
}

impl Session {
    /// Create an anonymous session with default transport settings
    pub fn new() -> Self {
        Self::from_client(Client::new())
    }

    /// Create a session from a config
    pub fn with_config(config: SessionConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (key, value) in &config.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| crate::Error::config(format!("Invalid header name '{key}': {e}")))?;
            headers.insert(name, HeaderValue::from_str(value)?);
        }

        let authenticated = match &config.token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
                true
            }
            None => false,
        };

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(crate::Error::Api)?;
        Ok(Self {
            client,
            authenticated,
        })
    }

    /// Create a session authenticated with a personal API token
    pub fn with_token(token: impl Into<String>) -> Result<Self> {
        Self::with_config(SessionConfig::builder().token(token).build())
    }

    /// Wrap an existing client
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            authenticated: false,
        }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Whether requests carry a bearer token
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}
