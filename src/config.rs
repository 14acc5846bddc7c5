use std::env;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;
use governor::Quota;

#[derive(Debug, Clone)]
pub struct Config {
    // Listener
    pub bind_address: String,
    pub port: u16,

    // Upstreams
    pub api_base_url: String,
    pub status_host: String,
    pub http_timeout_secs: u64,

    // Rate limiting configs
    pub status_period_secs: u64,
    pub status_burst_limit: u32,
    pub games_period_secs: u64,
    pub games_burst_limit: u32,

    // Active games
    pub max_active_games: usize,

    // Only honour X-Forwarded-For behind a trusted proxy
    pub trust_forwarded_for: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            api_base_url: "https://dom5.snek.earth".to_string(),
            status_host: "snek.earth".to_string(),
            http_timeout_secs: 10,
            status_period_secs: 5,
            status_burst_limit: 10,
            games_period_secs: 5,
            games_burst_limit: 5,
            max_active_games: 25,
            trust_forwarded_for: false,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn quota(period_secs: u64, burst_limit: u32) -> Quota {
    let burst = NonZeroU32::new(burst_limit).unwrap_or(NonZeroU32::MIN);
    Quota::with_period(Duration::from_secs(period_secs.max(1)))
        .unwrap_or_else(|| Quota::per_minute(burst))
        .allow_burst(burst)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env_or("BIND_ADDRESS", defaults.bind_address),
            port: env_or("PORT", defaults.port),
            api_base_url: env_or("API_BASE_URL", defaults.api_base_url),
            status_host: env_or("STATUS_HOST", defaults.status_host),
            http_timeout_secs: env_or("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
            status_period_secs: env_or("STATUS_PERIOD_SECS", defaults.status_period_secs),
            status_burst_limit: env_or("STATUS_BURST_LIMIT", defaults.status_burst_limit),
            games_period_secs: env_or("GAMES_PERIOD_SECS", defaults.games_period_secs),
            games_burst_limit: env_or("GAMES_BURST_LIMIT", defaults.games_burst_limit),
            max_active_games: env_or("MAX_ACTIVE_GAMES", defaults.max_active_games),
            trust_forwarded_for: env_or("TRUST_FORWARDED_FOR", defaults.trust_forwarded_for),
        }
    }

    pub fn bind(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn status_quota(&self) -> Quota {
        quota(self.status_period_secs, self.status_burst_limit)
    }

    pub fn games_quota(&self) -> Quota {
        quota(self.games_period_secs, self.games_burst_limit)
    }
}
