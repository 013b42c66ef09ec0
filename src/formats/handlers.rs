//! Format handler implementations
//!
//! Each handler covers one wire format.

use super::lines::Lines;
use super::types::{ByteStream, Format, FormatHandler, RecordStream};
use crate::error::{Error, Result};
use bytes::BytesMut;
use futures::{future, stream, StreamExt, TryStreamExt};
use serde_json::Value;

// ============================================================================
// JSON Handlers
// ============================================================================

/// Handler for the JSON family: plain, vendor MIME type, and newline-delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonHandler {
    format: Format,
}

/// Plain JSON
pub const JSON: JsonHandler = JsonHandler {
    format: Format::Json,
};

/// Standard JSON negotiated under the vendor MIME type
pub const LIJSON: JsonHandler = JsonHandler {
    format: Format::Lijson,
};

/// Newline-delimited JSON
pub const NDJSON: JsonHandler = JsonHandler {
    format: Format::Ndjson,
};

impl JsonHandler {
    fn is_line_delimited(self) -> bool {
        self.format == Format::Ndjson
    }
}

impl FormatHandler for JsonHandler {
    type Output = Value;

    fn format(&self) -> Format {
        self.format
    }

    /// Decode the whole body. NDJSON bodies decode to an array holding one
    /// element per non-empty line.
    fn parse(&self, body: &[u8]) -> Result<Value> {
        if !self.is_line_delimited() {
            return Ok(serde_json::from_slice(body)?);
        }

        let mut records = Vec::new();
        for (index, line) in body.split(|b| *b == b'\n').enumerate() {
            let line = std::str::from_utf8(line)
                .map_err(|e| Error::decode(format!("Line {} is not valid UTF-8: {e}", index + 1)))?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(decode_line(index + 1, line)?);
        }
        Ok(Value::Array(records))
    }

    /// NDJSON yields one record per non-empty line as each line arrives;
    /// the other JSON formats yield the whole document as a single unit.
    fn parse_stream(&self, body: ByteStream) -> RecordStream<Value> {
        if self.is_line_delimited() {
            return Lines::new(body)
                .enumerate()
                .filter_map(|(index, line)| {
                    future::ready(match line {
                        Ok(line) if line.trim().is_empty() => None,
                        Ok(line) => Some(decode_line(index + 1, &line)),
                        Err(e) => Some(Err(e)),
                    })
                })
                .boxed();
        }

        let handler = *self;
        stream::once(async move {
            let bytes = body
                .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                    acc.extend_from_slice(&chunk);
                    Ok::<_, Error>(acc)
                })
                .await?;
            handler.parse(&bytes)
        })
        .boxed()
    }
}

fn decode_line(line_num: usize, line: &str) -> Result<Value> {
    serde_json::from_str(line)
        .map_err(|e| Error::decode(format!("Failed to parse NDJSON at line {line_num}: {e}")))
}

// ============================================================================
// PGN Handler
// ============================================================================

/// Handler for chess games in PGN
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PgnHandler;

/// PGN text
pub const PGN: PgnHandler = PgnHandler;

impl FormatHandler for PgnHandler {
    type Output = String;

    fn format(&self) -> Format {
        Format::Pgn
    }

    /// The full body as text; multi-game bodies are left to the caller
    fn parse(&self, body: &[u8]) -> Result<String> {
        decode_text(body)
    }

    /// Splits a multi-game body into one unit per game.
    ///
    /// A game ends at an empty line that itself follows an empty line. A
    /// single empty line after content (the one between the tag section and
    /// the movetext) is kept inside the game.
    fn parse_stream(&self, body: ByteStream) -> RecordStream<String> {
        let state = PgnSplitter {
            lines: Lines::new(body),
            buf: Vec::new(),
            last_line: true,
        };

        stream::unfold(Some(state), |state| async move {
            let mut state = state?;
            loop {
                match state.lines.next().await {
                    Some(Ok(line)) => {
                        let has_content = !line.is_empty();
                        if state.last_line || has_content {
                            state.buf.push(line);
                            state.last_line = has_content;
                        } else {
                            state.last_line = false;
                            let game = state.flush();
                            return Some((Ok(game), Some(state)));
                        }
                    }
                    Some(Err(e)) => return Some((Err(e), Some(state))),
                    None if state.buf.is_empty() => return None,
                    None => {
                        let game = state.flush();
                        return Some((Ok(game), None));
                    }
                }
            }
        })
        .boxed()
    }
}

struct PgnSplitter {
    lines: Lines<ByteStream>,
    buf: Vec<String>,
    /// Whether the previous line had content
    last_line: bool,
}

impl PgnSplitter {
    fn flush(&mut self) -> String {
        let game = self.buf.join("\n").trim().to_string();
        self.buf.clear();
        game
    }
}

// ============================================================================
// Text Handler
// ============================================================================

/// Handler for plain text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextHandler;

/// Plain text
pub const TEXT: TextHandler = TextHandler;

impl FormatHandler for TextHandler {
    type Output = String;

    fn format(&self) -> Format {
        Format::Text
    }

    fn parse(&self, body: &[u8]) -> Result<String> {
        decode_text(body)
    }

    /// Every line, empty ones included
    fn parse_stream(&self, body: ByteStream) -> RecordStream<String> {
        Lines::new(body).boxed()
    }
}

fn decode_text(body: &[u8]) -> Result<String> {
    String::from_utf8(body.to_vec())
        .map_err(|e| Error::decode(format!("Body is not valid UTF-8: {e}")))
}
