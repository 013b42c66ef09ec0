//! CLI module
//!
//! Command-line interface for ad hoc requests against the Lichess services.
//!
//! # Commands
//!
//! - `get` - Send a GET request and print the decoded response
//! - `post` - Send a POST request with an optional form, JSON or text body

mod commands;
mod runner;

pub use commands::{Cli, Commands, FormatArg, RequestArgs, Service};
pub use runner::Runner;
