//! CLI commands and argument parsing

use crate::formats::Format;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for the Lichess API
#[derive(Parser, Debug)]
#[command(name = "lila-client")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL
    #[arg(long, global = true, env = "LICHESS_BASE_URL")]
    pub base_url: Option<String>,

    /// Personal API token
    #[arg(long, global = true, env = "LICHESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Service to send the request to
    #[arg(long, global = true, default_value = "api")]
    pub service: Service,

    /// Pretty-print JSON records
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a GET request
    Get {
        /// Path relative to the service base URL
        path: String,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Send a POST request
    Post {
        /// Path relative to the service base URL
        path: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Form field (key=value), repeatable
        #[arg(long, value_parser = parse_key_val, conflicts_with_all = ["json", "text"])]
        form: Vec<(String, String)>,

        /// JSON body
        #[arg(long, conflicts_with = "text")]
        json: Option<String>,

        /// Raw text body, such as a PGN to import
        #[arg(long)]
        text: Option<String>,
    },
}

/// Options shared by every request
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Response format
    #[arg(short, long, default_value = "json")]
    pub format: FormatArg,

    /// Print each unit as it arrives
    #[arg(short, long)]
    pub stream: bool,

    /// Query parameter (key=value), repeatable
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,
}

/// Response format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    /// application/json
    Json,
    /// application/vnd.lichess.v3+json
    Lijson,
    /// application/x-ndjson
    Ndjson,
    /// application/x-chess-pgn
    Pgn,
    /// text/plain
    Text,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::Json,
            FormatArg::Lijson => Format::Lijson,
            FormatArg::Ndjson => Format::Ndjson,
            FormatArg::Pgn => Format::Pgn,
            FormatArg::Text => Format::Text,
        }
    }
}

/// Lichess service
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Service {
    /// Main API
    Api,
    /// Endgame tablebase
    Tablebase,
    /// Opening explorer
    Explorer,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
