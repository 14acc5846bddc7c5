// src/error.rs
use std::time::Duration;

use crate::protocol::DecodeError;

/// Everything that can go wrong while checking a game's status.
///
/// A status check is all-or-nothing: any of these aborts the whole check.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("could not reach status server {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("status server {addr} did not answer within {after:?}")]
    Timeout { addr: String, after: Duration },

    #[error("malformed status data: {0}")]
    Decode(#[from] DecodeError),

    #[error("hosting API request failed: {0}")]
    Upstream(String),

    #[error("invalid game id: {0}")]
    InvalidGameId(String),
}

impl StatusError {
    /// True for failures of the socket leg (connect, IO or deadline).
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

impl From<reqwest::Error> for StatusError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}
