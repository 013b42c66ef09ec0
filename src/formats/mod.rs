//! Response format handlers
//!
//! Supports: JSON, vendor JSON, NDJSON, PGN, plain text
//!
//! # Overview
//!
//! A format handler decides the `Accept` header sent with a request and how
//! the response body is decoded, either all at once ([`FormatHandler::parse`])
//! or lazily, one unit per pull ([`FormatHandler::parse_stream`]).

mod handlers;
mod lines;
mod types;

pub use handlers::{JsonHandler, PgnHandler, TextHandler, JSON, LIJSON, NDJSON, PGN, TEXT};
pub use lines::Lines;
pub use types::{ByteStream, Format, FormatHandler, RecordStream};
