// src/api/client.rs
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::error::StatusError;
use crate::models::game::{GameId, NationRecord, NationType, TurnStatus};
use crate::protocol::DecodeError;

/// The hosting service's JSON status endpoints.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// `GET /api/games/{id}`
    async fn game_details(&self, id: GameId) -> Result<GameDetails, StatusError>;

    /// `GET /api/games/{id}/status`
    async fn game_nations(&self, id: GameId) -> Result<Vec<NationEntry>, StatusError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameDetails {
    pub name: String,
}

/// The endpoint sends codes as numbers or as numeric strings, depending on the field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Code {
    Number(i64),
    Text(String),
}

impl Code {
    pub fn value(&self) -> Result<i64, DecodeError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| DecodeError::InvalidCode(s.clone())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NationEntry {
    pub nationid: Code,
    pub name: String,
    #[serde(default)]
    pub epithet: String,
    pub controller: Code,
    pub turnplayed: Code,
}

impl NationEntry {
    pub fn into_record(self) -> Result<NationRecord, DecodeError> {
        let raw_id = self.nationid.value()?;
        let id = u32::try_from(raw_id).map_err(|_| DecodeError::InvalidCode(raw_id.to_string()))?;

        Ok(NationRecord {
            id,
            name: self.name,
            epithet: self.epithet,
            controller: NationType::from_code(self.controller.value()?)?,
            turn_status: TurnStatus::from_code(self.turnplayed.value()?)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct NationsResponse {
    nations: Vec<NationEntry>,
}

/// `GameApi` over HTTP against a snek.earth-style host.
pub struct SnekApi {
    client: reqwest::Client,
    base_url: String,
}

impl SnekApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StatusError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StatusError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl GameApi for SnekApi {
    async fn game_details(&self, id: GameId) -> Result<GameDetails, StatusError> {
        self.get_json(&format!("/api/games/{}", id)).await
    }

    async fn game_nations(&self, id: GameId) -> Result<Vec<NationEntry>, StatusError> {
        let response: NationsResponse = self.get_json(&format!("/api/games/{}/status", id)).await?;
        debug!("Game {} reports {} nations", id, response.nations.len());
        Ok(response.nations)
    }
}
