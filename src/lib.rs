// src/lib.rs
//! Live status for hosted Dominions games: turn, timer and who still owes orders.

pub mod api;
pub mod blocks;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod protocol;
pub mod status;
pub mod storage;
pub mod utils;

pub use error::StatusError;
pub use models::game::{Game, GameId, GameStatus, NationRecord, NationType, TurnStatus};
pub use status::StatusService;
