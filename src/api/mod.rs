// src/api/mod.rs
pub mod client;

pub use client::{Code, GameApi, GameDetails, NationEntry, SnekApi};
