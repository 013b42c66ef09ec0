// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unused_async)]

//! # Lichess client transport
//!
//! The request and response layer of a Lichess API client: content
//! negotiation, response decoding and error classification, shared by every
//! resource-specific client built on top.
//!
//! ## Features
//!
//! - **Format handlers**: JSON, the vendor JSON type, NDJSON, PGN and plain text
//! - **Streaming**: lazy decoding of long-lived responses, one unit per pull
//! - **Error classification**: transport failures vs. error statuses with a lazily decoded cause
//! - **Converters**: per-record post-processing such as timestamp normalization
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::TryStreamExt;
//! use lila_client::{models, Client, Request, NDJSON};
//!
//! #[tokio::main]
//! async fn main() -> lila_client::Result<()> {
//!     let client = Client::new()?;
//!
//!     let mut games = client
//!         .api()
//!         .get(
//!             "/api/games/user/bobby",
//!             Request::with_format(NDJSON)
//!                 .stream()
//!                 .param("max", 10)
//!                 .converter(models::GAME.converter()),
//!         )
//!         .await?
//!         .into_stream();
//!
//!     while let Some(game) = games.try_next().await? {
//!         println!("{}", game["id"]);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Client: api / tablebase / explorer requestors           │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │
//! ┌──────────────┬─────────────┴──────┬──────────────────────┐
//! │  Requestor   │   Format handlers  │   Models             │
//! ├──────────────┼────────────────────┼──────────────────────┤
//! │ Session      │ JSON / LIJSON      │ field conversions    │
//! │ URL joining  │ NDJSON lines       │ adapters             │
//! │ Error status │ PGN games / TEXT   │                      │
//! └──────────────┴────────────────────┴──────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the client
pub mod error;

/// Common types and type aliases
pub mod types;

/// Wire formats: negotiation and decoding
pub mod formats;

/// Sessions and request dispatch
pub mod http;

/// Response converters and model tables
pub mod models;

/// Client configuration
pub mod config;

/// Client entry point
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::Client;
pub use config::ClientConfig;
pub use error::{Error, ResponseError, Result};
pub use formats::{Format, FormatHandler, JSON, LIJSON, NDJSON, PGN, TEXT};
pub use http::{Reply, Request, Requestor, Session};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
