//! Error types for the Lichess transport layer
//!
//! Three failure categories reach callers:
//! - transport failures (`Error::Api`), wrapping the underlying `reqwest` error
//! - error statuses (`Error::Response`), carrying status, reason and the
//!   best-effort decoded error body
//! - decode failures (`Error::JsonParse` / `Error::Decode`) for bodies that do
//!   not match the negotiated format

use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// The main error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Transport Errors
    // ============================================================================
    /// The request never produced a response (connection refused, DNS, timeout, ...)
    #[error("{0}")]
    Api(#[source] reqwest::Error),

    /// The server answered with an error status
    #[error(transparent)]
    Response(#[from] ResponseError),

    // ============================================================================
    // Decode Errors
    // ============================================================================
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Request Construction Errors
    // ============================================================================
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Status code of an error response, if this is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Response(e) => Some(e.status_code()),
            _ => None,
        }
    }

    /// True for failures of the HTTP exchange itself (no response, or an error status)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Api(_) | Error::Response(_))
    }

    /// True for a 404 response
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND.as_u16())
    }
}

/// An HTTP response whose status indicates failure.
///
/// The body is kept as received; [`ResponseError::cause`] decodes it as JSON
/// on first access and caches the outcome.
#[derive(Debug)]
pub struct ResponseError {
    status: StatusCode,
    reason: String,
    body: Bytes,
    cause: OnceLock<Option<Value>>,
}

impl ResponseError {
    /// Build an error from its parts
    pub fn new(status: StatusCode, reason: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: reason.into(),
            body: body.into(),
            cause: OnceLock::new(),
        }
    }

    /// Consume a failed response, reading whatever body it carries.
    ///
    /// A body that cannot be read is treated as empty.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default();
        let body = response.bytes().await.unwrap_or_default();
        Self::new(status, reason, body)
    }

    /// Numeric HTTP status code
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Typed HTTP status
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Status text of the response
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Raw response body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The error body decoded as JSON, or `None` when it is absent or not JSON
    pub fn cause(&self) -> Option<&Value> {
        self.cause
            .get_or_init(|| serde_json::from_slice(&self.body).ok())
            .as_ref()
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status_code(), self.reason)?;
        match self.cause() {
            Some(cause) if is_truthy(cause) => write!(f, ": {cause}"),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for ResponseError {}

/// Empty containers, empty strings, zero, false and null carry no cause worth printing
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
