// src/handlers/mod.rs
pub mod games;
pub mod index;
pub mod status;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index::index))
        .route("/games", web::get().to(games::list_games))
        .route("/games", web::post().to(games::add_game))
        .route("/games/{id}", web::delete().to(games::remove_game))
        .route("/games/{id}/status", web::get().to(status::get_game_status));
}
