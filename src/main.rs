// src/main.rs
use actix_web::{web, App, HttpServer};
use dominions_status::api::SnekApi;
use dominions_status::config::Config;
use dominions_status::handlers;
use dominions_status::status::StatusService;
use dominions_status::storage::memory::ActiveGames;
use dominions_status::utils::{GamesLimiter, StatusLimiter};
use env_logger::Env;
use governor::RateLimiter;
use log::{error, info};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env();

    let api = match SnekApi::new(&config.api_base_url, config.http_timeout()) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to build hosting API client: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to build hosting API client: {}", e),
            ));
        }
    };

    let service = web::Data::new(StatusService::new(Arc::new(api), config.status_host.clone()));
    let storage = web::Data::new(ActiveGames::new(config.max_active_games));
    let status_limiter = web::Data::new(StatusLimiter(RateLimiter::keyed(config.status_quota())));
    let games_limiter = web::Data::new(GamesLimiter(RateLimiter::keyed(config.games_quota())));

    let bind = config.bind();
    info!(
        "Starting status service on {} (API {}, status host {})",
        bind, config.api_base_url, config.status_host
    );

    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(config.clone())
            .app_data(service.clone())
            .app_data(storage.clone())
            .app_data(status_limiter.clone())
            .app_data(games_limiter.clone())
            .configure(handlers::configure)
    })
    .bind(&bind)?
    .run()
    .await
}
