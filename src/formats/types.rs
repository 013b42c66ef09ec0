//! Format types and traits
//!
//! Defines the closed set of wire formats and the handler abstraction.

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::stream::BoxStream;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chunked response body as delivered by the transport
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Lazy, single-pass sequence of decoded units
pub type RecordStream<T> = BoxStream<'static, Result<T>>;

/// Wire format of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON format (default)
    #[default]
    Json,
    /// Standard JSON served under the vendor MIME type
    Lijson,
    /// Newline-delimited JSON (one document per line)
    Ndjson,
    /// Chess games in portable game notation
    Pgn,
    /// Plain text
    Text,
}

impl Format {
    /// MIME type negotiated through the `Accept` header
    pub const fn mime_type(self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Lijson => "application/vnd.lichess.v3+json",
            Format::Ndjson => "application/x-ndjson",
            Format::Pgn => "application/x-chess-pgn",
            Format::Text => "text/plain",
        }
    }

    /// Lowercase name of the format
    pub const fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Lijson => "lijson",
            Format::Ndjson => "ndjson",
            Format::Pgn => "pgn",
            Format::Text => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "lijson" => Ok(Format::Lijson),
            "ndjson" => Ok(Format::Ndjson),
            "pgn" => Ok(Format::Pgn),
            "text" => Ok(Format::Text),
            other => Err(Error::config(format!("Unknown format: {other}"))),
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for crate::formats::JsonHandler {}
    impl Sealed for crate::formats::PgnHandler {}
    impl Sealed for crate::formats::TextHandler {}
}

/// Negotiates and decodes one wire format.
///
/// The same handler governs both the `Accept` header of a request and the
/// decoding of its response. The trait is sealed; the handler set is fixed.
pub trait FormatHandler: sealed::Sealed + fmt::Debug + Copy + Send + Sync + 'static {
    /// Decoded unit
    type Output: Send + 'static;

    /// The format this handler speaks
    fn format(&self) -> Format;

    /// MIME type sent as `Accept`
    fn mime_type(&self) -> &'static str {
        self.format().mime_type()
    }

    /// Request headers for this format
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(self.mime_type()));
        headers
    }

    /// Decode a complete response body
    fn parse(&self, body: &[u8]) -> Result<Self::Output>;

    /// Decode a response body incrementally.
    ///
    /// Nothing is read from `body` until the returned stream is polled, and
    /// each poll reads only as far as the next unit requires.
    fn parse_stream(&self, body: ByteStream) -> RecordStream<Self::Output>;
}
