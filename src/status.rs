// src/status.rs
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;

use crate::api::GameApi;
use crate::error::StatusError;
use crate::models::game::{Game, GameId, GameStatus, NationRecord};
use crate::protocol::{self, QUERY_TIMEOUT};

/// Joins the hosting API and the game's own status server into one `Game`.
///
/// Holds no per-game state; every call starts from scratch.
pub struct StatusService {
    api: Arc<dyn GameApi>,
    status_host: String,
    query_timeout: Duration,
}

impl StatusService {
    pub fn new(api: Arc<dyn GameApi>, status_host: impl Into<String>) -> Self {
        Self {
            api,
            status_host: status_host.into(),
            query_timeout: QUERY_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Reads a user-supplied game id or address for this service's status host.
    pub fn parse_game_id(&self, s: &str) -> Result<GameId, StatusError> {
        GameId::parse_for_host(s, &self.status_host)
    }

    /// Name from the API, turn and timer from the status server.
    pub async fn game_status(&self, id: GameId) -> Result<GameStatus, StatusError> {
        let details = self.api.game_details(id).await?;

        let port = id.status_port();
        debug!("Querying status server {}:{} for game {}", self.status_host, port, id);
        let raw = protocol::query_with_timeout(&self.status_host, port, self.query_timeout).await?;

        Ok(GameStatus {
            name: details.name,
            turn: raw.turn,
            hours_remaining: raw.hours_remaining,
        })
    }

    pub async fn player_status(&self, id: GameId) -> Result<Vec<NationRecord>, StatusError> {
        let nations = self.api.game_nations(id).await?;
        let players = nations
            .into_iter()
            .map(|nation| nation.into_record())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(players)
    }

    pub async fn fetch_game(&self, id: GameId) -> Result<Game, StatusError> {
        let status = self.game_status(id).await?;
        let players = self.player_status(id).await?;

        info!(
            "Game {} ({}) is on turn {} with {:.2}h left, {} nations",
            id,
            status.name,
            status.turn,
            status.hours_remaining,
            players.len()
        );

        Ok(Game {
            server_id: id,
            name: status.name,
            turn: status.turn,
            hours_remaining: status.hours_remaining,
            players,
        })
    }
}
