//! Client entry point
//!
//! Holds one requestor per service (API, tablebase, opening explorer), all
//! sharing a single session. Resource clients build on these requestors.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::formats::Format;
use crate::http::{Requestor, Session};

/// Requestors for every Lichess service, over one shared session
#[derive(Debug, Clone)]
pub struct Client {
    api: Requestor,
    tablebase: Requestor,
    explorer: Requestor,
    pgn_as_default: bool,
}

impl Client {
    /// Anonymous client against the public services
    pub fn new() -> Result<Self> {
        Self::with_config(&ClientConfig::default())
    }

    /// Client described by a config, with a session built from it
    pub fn with_config(config: &ClientConfig) -> Result<Self> {
        Self::with_session(config.session()?, config)
    }

    /// Client over an existing session; the config's token and transport settings are ignored
    pub fn with_session(session: Session, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            api: Requestor::new(session.clone(), &config.base_url)?,
            tablebase: Requestor::new(session.clone(), &config.tablebase_url)?,
            explorer: Requestor::new(session, &config.explorer_url)?,
            pgn_as_default: config.pgn_as_default,
        })
    }

    /// Requestor for the main API
    pub fn api(&self) -> &Requestor {
        &self.api
    }

    /// Requestor for tablebase lookups
    pub fn tablebase(&self) -> &Requestor {
        &self.tablebase
    }

    /// Requestor for the opening explorer
    pub fn explorer(&self) -> &Requestor {
        &self.explorer
    }

    /// The shared session
    pub fn session(&self) -> &Session {
        self.api.session()
    }

    /// Whether game exports default to PGN
    pub fn pgn_as_default(&self) -> bool {
        self.pgn_as_default
    }

    /// An explicit choice wins; otherwise the configured default
    pub fn use_pgn(&self, as_pgn: Option<bool>) -> bool {
        as_pgn.unwrap_or(self.pgn_as_default)
    }

    /// Format for a game export: PGN, or NDJSON records
    pub fn game_format(&self, as_pgn: Option<bool>) -> Format {
        if self.use_pgn(as_pgn) {
            Format::Pgn
        } else {
            Format::Ndjson
        }
    }
}
