//! Configuration module for environment variable parsing.
//!
//! All values are read once at startup. A missing secret or a bad store
//! capacity is a [`ConfigError`] and the server refuses to start.

use std::env;

use crate::error::ConfigError;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 4000;

/// Default number of received webhooks kept in memory.
pub const DEFAULT_STORE_CAPACITY: usize = 50;

/// Default upper bound on an inbound webhook body (2 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Shared secret used to verify `X-Webhook-Signature`
    pub webhook_secret: String,

    /// Maximum number of received webhooks retained
    pub store_capacity: usize,

    /// Bodies larger than this are treated as unreadable
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("webhook_secret", &"<redacted>")
            .field("store_capacity", &self.store_capacity)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_secret = lookup("WEBHOOK_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let port = parse_number(&lookup, "PORT", DEFAULT_PORT)?;

        let store_capacity =
            parse_number(&lookup, "WEBHOOK_STORE_CAPACITY", DEFAULT_STORE_CAPACITY)?;
        if store_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let max_body_bytes =
            parse_number(&lookup, "MAX_WEBHOOK_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?;

        Ok(Config {
            port,
            webhook_secret,
            store_capacity,
            max_body_bytes,
        })
    }
}

/// Parse an unsigned integer variable, falling back to `default` when unset.
fn parse_number<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
    }
}
