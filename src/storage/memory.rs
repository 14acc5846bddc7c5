// src/storage/memory.rs
use dashmap::DashMap;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::game::{Game, GameId};

/// A game someone asked the bot to keep an eye on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveGame {
    pub id: GameId,
    pub name: String,
    pub turn: u32,
    pub added_at: u64,
}

impl ActiveGame {
    pub fn from_game(game: &Game) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            id: game.server_id,
            name: game.name.clone(),
            turn: game.turn,
            added_at: now,
        }
    }
}

pub struct ActiveGames {
    games: DashMap<GameId, ActiveGame>,
    max_games: usize,
}

impl ActiveGames {
    pub fn new(max_games: usize) -> Self {
        Self {
            games: DashMap::new(),
            max_games,
        }
    }

    /// Adds or refreshes a game. Refreshing never counts against the limit.
    pub fn add_game(&self, game: ActiveGame) -> Result<(), String> {
        if !self.games.contains_key(&game.id) && self.games.len() >= self.max_games {
            return Err(format!(
                "Maximum number of active games ({}) reached",
                self.max_games
            ));
        }

        self.games.insert(game.id, game);
        Ok(())
    }

    pub fn get_games(&self) -> Vec<ActiveGame> {
        let mut games: Vec<ActiveGame> = self.games.iter().map(|r| r.value().clone()).collect();
        games.sort_by_key(|g| g.id);
        games
    }

    pub fn remove_game(&self, id: GameId) -> Option<ActiveGame> {
        self.games.remove(&id).map(|(_, game)| game)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
