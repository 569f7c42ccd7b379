//! Service configuration parsed from environment variables.
//!
//! `main` loads `.env` (via `dotenvy`) before calling [`AppConfig::from_env`].
//! Parsing goes through a lookup function so tests never touch the process
//! environment.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PREVIEW_RESEND_DELAY_MS: u64 = landing::preview::DEFAULT_PREVIEW_RESEND_DELAY_MS;
pub const DEFAULT_WS_CLIENT_QUEUE: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
}

impl crate::frame::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "E_CONFIG_MISSING",
        }
    }
}

/// Settings the request path needs at runtime. Copied into `AppState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Wait before replaying the last preview snapshot to a surface that
    /// just announced it is ready.
    pub preview_resend_delay: Duration,
    /// Capacity of each socket's outbound frame queue.
    pub ws_client_queue: usize,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            preview_resend_delay: Duration::from_millis(DEFAULT_PREVIEW_RESEND_DELAY_MS),
            ws_client_queue: DEFAULT_WS_CLIENT_QUEUE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub runtime: RuntimeSettings,
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional (unparseable values fall back to the default):
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `PREVIEW_RESEND_DELAY_MS`: default 500
    /// - `WS_CLIENT_QUEUE`: default 256
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is unset or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let ws_client_queue = parse_or(&lookup, "WS_CLIENT_QUEUE", DEFAULT_WS_CLIENT_QUEUE);
        Ok(Self {
            database_url,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS).max(1),
            runtime: RuntimeSettings {
                preview_resend_delay: Duration::from_millis(parse_or(
                    &lookup,
                    "PREVIEW_RESEND_DELAY_MS",
                    DEFAULT_PREVIEW_RESEND_DELAY_MS,
                )),
                ws_client_queue: if ws_client_queue == 0 { DEFAULT_WS_CLIENT_QUEUE } else { ws_client_queue },
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key).and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
