// src/utils.rs
use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::RateLimiter;
use log::{debug, error};
use std::fmt;
use std::net::IpAddr;

use crate::config::Config;
use crate::error::StatusError;
use crate::models::game::GameId;

pub type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Per-IP limiter for status checks.
pub struct StatusLimiter(pub KeyedLimiter);

/// Per-IP limiter for active-game changes and listings.
pub struct GamesLimiter(pub KeyedLimiter);

#[derive(Debug)]
pub enum RequestError {
    MissingPeerIP,
    RateLimitExceeded,
    GameNotFound(GameId),
    CapacityReached(String),
    Status(StatusError),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPeerIP => write!(f, "Failed to extract client IP"),
            Self::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            Self::GameNotFound(id) => write!(f, "Game {} is not being tracked", id),
            Self::CapacityReached(msg) => write!(f, "{}", msg),
            Self::Status(e) => write!(f, "{}", e),
        }
    }
}

impl From<StatusError> for RequestError {
    fn from(err: StatusError) -> Self {
        Self::Status(err)
    }
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingPeerIP => StatusCode::BAD_REQUEST,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::GameNotFound(_) => StatusCode::NOT_FOUND,
            Self::CapacityReached(_) => StatusCode::CONFLICT,
            Self::Status(StatusError::InvalidGameId(_)) => StatusCode::BAD_REQUEST,
            Self::Status(e) if e.is_connection() => StatusCode::GATEWAY_TIMEOUT,
            Self::Status(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

/// Client address for rate limiting. `X-Forwarded-For` only counts when configured.
pub fn extract_client_ip(req: &HttpRequest, config: &Config) -> Result<IpAddr, RequestError> {
    if config.trust_forwarded_for {
        if let Some(ip) = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
        {
            debug!("Using X-Forwarded-For client IP: {}", ip);
            return Ok(ip);
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip())
        .ok_or(RequestError::MissingPeerIP)
}

pub fn check_rate(limiter: &KeyedLimiter, ip: IpAddr, route: &str) -> Result<(), RequestError> {
    if limiter.check_key(&ip).is_err() {
        error!("Rate limit exceeded for {} for ip: {}", route, ip);
        return Err(RequestError::RateLimitExceeded);
    }
    Ok(())
}
