//! HTTP module
//!
//! Provides the shared session and the request dispatcher.
//!
//! # Features
//!
//! - **Content negotiation**: the format handler sets `Accept` and decodes the body
//! - **Buffered or lazy decoding**: one value, or a stream decoded unit by unit
//! - **Error classification**: transport failures vs. error statuses
//!
//! Retries, pagination, rate limiting and caching are not handled here.

mod requestor;
mod session;

pub use requestor::{Reply, Request, Requestor};
pub use session::{Session, SessionConfig, SessionConfigBuilder};
