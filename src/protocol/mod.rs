// src/protocol/mod.rs
//! Legacy game-server status protocol: one fixed request, one framed reply.

pub mod client;
pub mod packet;

pub use client::{query, query_with_timeout, QUERY_TIMEOUT};
pub use packet::{decode_frame, GeneralInfo, PacketHeader};

/// The reply could not be unpacked into the expected layout.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("packet too short: need at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    #[error("bad packet magic 0x{0:02X}")]
    BadMagic(u8),

    #[error("header declares a {declared} byte frame but {actual} bytes arrived")]
    Truncated { declared: usize, actual: usize },

    #[error("header declares a {0} byte frame, larger than any status reply")]
    FrameTooLarge(usize),

    #[error("status body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("could not inflate compressed payload: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("body of {body_len} bytes leaves no room for the game name (minimum {minimum})")]
    NegativeNameLength { body_len: usize, minimum: usize },

    #[error("packet ended early: {0}")]
    UnexpectedEof(#[from] std::io::Error),

    #[error("unknown nation controller code {0}")]
    UnknownNationType(i64),

    #[error("unknown turn status code {0}")]
    UnknownTurnStatus(i64),

    #[error("not a numeric code: {0:?}")]
    InvalidCode(String),
}
