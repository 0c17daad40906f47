//! Service configuration loaded from environment variables.

use std::time::Duration;

/// Reads from environment variables (a `.env` file is honoured by `main`):
/// - `REDIS_ADDR`: `host:port` or a full `redis://` URL (default: `localhost:6379`)
/// - `HOST`: bind address (default: `0.0.0.0`)
/// - `SERVER_PORT`: listen port (default: `3000`)
/// - `REDIS_TIMEOUT_MS`: deadline for a single Redis call (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_addr: String,
    pub host: String,
    pub port: u16,
    pub redis_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            redis_addr: lookup("REDIS_ADDR").unwrap_or(defaults.redis_addr),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or("SERVER_PORT", lookup("SERVER_PORT"), defaults.port),
            redis_timeout: Duration::from_millis(parse_or(
                "REDIS_TIMEOUT_MS",
                lookup("REDIS_TIMEOUT_MS"),
                defaults.redis_timeout.as_millis() as u64,
            )),
        }
    }

    pub fn redis_url(&self) -> String {
        if self.redis_addr.starts_with("redis://") || self.redis_addr.starts_with("rediss://") {
            self.redis_addr.clone()
        } else {
            format!("redis://{}", self.redis_addr)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            redis_addr: "localhost:6379".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            redis_timeout: Duration::from_millis(5000),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(
    name: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid {}={:?}, using {}", name, raw, default);
            default
        }),
    }
}
