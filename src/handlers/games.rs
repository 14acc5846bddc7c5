// src/handlers/games.rs
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error, info};
use serde::Deserialize;

use crate::config::Config;
use crate::models::game::GameId;
use crate::status::StatusService;
use crate::storage::memory::{ActiveGame, ActiveGames};
use crate::utils::{check_rate, extract_client_ip, GamesLimiter, RequestError};

#[derive(Deserialize)]
pub struct AddGameRequest {
    /// A bare id or a `host:port` address.
    game: String,
}

pub async fn add_game(
    req: HttpRequest,
    body: web::Json<AddGameRequest>,
    storage: web::Data<ActiveGames>,
    service: web::Data<StatusService>,
    config: web::Data<Config>,
    rate_limiter: web::Data<GamesLimiter>,
) -> Result<HttpResponse, RequestError> {
    let client_ip = extract_client_ip(&req, &config)?;
    check_rate(&rate_limiter.0, client_ip, "add game")?;

    let id = service.parse_game_id(&body.game)?;

    // Only games that answer a full status check get tracked.
    let game = service.fetch_game(id).await.map_err(|e| {
        error!("Refusing to track game {}: {}", id, e);
        RequestError::from(e)
    })?;

    let entry = ActiveGame::from_game(&game);
    if let Err(e) = storage.add_game(entry.clone()) {
        error!("Failed to add game {}: {}", id, e);
        return Err(RequestError::CapacityReached(e));
    }

    info!("Tracking game {} ({}) for {}", id, entry.name, client_ip);
    Ok(HttpResponse::Ok().json(entry))
}

pub async fn list_games(
    req: HttpRequest,
    storage: web::Data<ActiveGames>,
    config: web::Data<Config>,
    rate_limiter: web::Data<GamesLimiter>,
) -> Result<HttpResponse, RequestError> {
    let client_ip = extract_client_ip(&req, &config)?;
    check_rate(&rate_limiter.0, client_ip, "game list")?;

    let games = storage.get_games();
    debug!("Listing {} active games", games.len());
    Ok(HttpResponse::Ok().json(games))
}

pub async fn remove_game(
    req: HttpRequest,
    path: web::Path<String>,
    storage: web::Data<ActiveGames>,
    config: web::Data<Config>,
    rate_limiter: web::Data<GamesLimiter>,
) -> Result<HttpResponse, RequestError> {
    let client_ip = extract_client_ip(&req, &config)?;
    check_rate(&rate_limiter.0, client_ip, "remove game")?;

    let id: GameId = path.parse()?;
    match storage.remove_game(id) {
        Some(game) => {
            info!("Stopped tracking game {} ({})", id, game.name);
            Ok(HttpResponse::Ok().json(game))
        }
        None => {
            error!("Game {} not found for removal", id);
            Err(RequestError::GameNotFound(id))
        }
    }
}
