// src/handlers/status.rs
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error};
use serde::Serialize;

use crate::blocks::{self, Block};
use crate::config::Config;
use crate::models::game::Game;
use crate::status::StatusService;
use crate::utils::{check_rate, extract_client_ip, RequestError, StatusLimiter};

#[derive(Serialize)]
pub struct StatusReport {
    pub game: Game,
    pub blocks: Vec<Block>,
}

pub async fn get_game_status(
    req: HttpRequest,
    path: web::Path<String>,
    service: web::Data<StatusService>,
    config: web::Data<Config>,
    rate_limiter: web::Data<StatusLimiter>,
) -> Result<HttpResponse, RequestError> {
    let client_ip = extract_client_ip(&req, &config)?;
    check_rate(&rate_limiter.0, client_ip, "status")?;

    let id = service.parse_game_id(&path)?;
    debug!("Status check for game {} from {}", id, client_ip);

    let game = service.fetch_game(id).await.map_err(|e| {
        error!("Status check for game {} failed: {}", id, e);
        RequestError::from(e)
    })?;

    let blocks = blocks::render(&game);
    Ok(HttpResponse::Ok().json(StatusReport { game, blocks }))
}
