use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FEED_URL: &str =
    "https://nap.dgt.es/datex2/v3/dgt/SituationPublication/datex2_v36.xml";
pub const DEFAULT_RELAY_URL: &str = "https://api.codetabs.com/v1/proxy?quest=";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://v16-settings.db?mode=rwc";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidSeconds { name: &'static str, value: String },
    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

/// Everything the feed client needs to reach the DGT feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedConfig {
    pub feed_url: String,
    pub relay_url: String,
    pub request_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub refresh_interval: Duration,
    pub database_url: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads `.env.local` if present, then reads the `V16_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env.local");
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |name: &'static str, fallback: String| -> Result<String, ConfigError> {
            match lookup(name) {
                Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { name }),
                Some(value) => Ok(value.trim().to_string()),
                None => Ok(fallback),
            }
        };

        let feed_url = read("V16_FEED_URL", defaults.feed.feed_url)?;
        let relay_url = read("V16_RELAY_URL", defaults.feed.relay_url)?;
        let request_timeout = read_seconds(
            "V16_REQUEST_TIMEOUT_SECS",
            lookup("V16_REQUEST_TIMEOUT_SECS"),
            defaults.feed.request_timeout,
        )?;
        let refresh_interval = read_seconds(
            "V16_REFRESH_INTERVAL_SECS",
            lookup("V16_REFRESH_INTERVAL_SECS"),
            defaults.refresh_interval,
        )?;
        let database_url = read("V16_DATABASE_URL", defaults.database_url)?;
        let log_level = read("V16_LOG_LEVEL", defaults.log_level)?;

        Ok(Self {
            feed: FeedConfig {
                feed_url,
                relay_url,
                request_timeout,
            },
            refresh_interval,
            database_url,
            log_level,
        })
    }
}

pub fn parse_seconds(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds {
            name,
            value: raw.to_string(),
        }),
    }
}

fn read_seconds(
    name: &'static str,
    raw: Option<String>,
    fallback: Duration,
) -> Result<Duration, ConfigError> {
    match raw {
        Some(value) => parse_seconds(name, &value),
        None => Ok(fallback),
    }
}
