//! Environment-driven configuration, loaded once at startup.
//!
//! Grounded in `config/env.go`'s field set; read by hand with `std::env`
//! rather than an envconfig-style crate, since none appears anywhere in
//! the retrieval pack.

use std::env;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a valid {kind}, got {value:?}")]
    Invalid {
        field: &'static str,
        kind: &'static str,
        value: String,
    },
}

/// Service-wide configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service: String,
    pub env: String,
    pub log_level: String,
    pub api_key: String,
    pub db_path: String,
    pub coupon_dir: String,
    pub bind_addr: String,
}

impl Config {
    /// Loads configuration from the environment, falling back to the same
    /// defaults the original service shipped with.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_or("API_KEY", "test");
        if api_key.is_empty() {
            return Err(ConfigError::Invalid {
                field: "API_KEY",
                kind: "non-empty string",
                value: api_key,
            });
        }

        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:8080");
        if bind_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid {
                field: "BIND_ADDR",
                kind: "socket address",
                value: bind_addr,
            });
        }

        Ok(Self {
            service: env_or("SERVICE", "food-order-online"),
            env: env_or("ENV", "dev"),
            log_level: env_or("LOG_LEVEL", "info"),
            api_key,
            db_path: env_or("DB_PATH", "foodhub.db"),
            coupon_dir: env_or("COUPON_DIR", "./coupons"),
            bind_addr,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
