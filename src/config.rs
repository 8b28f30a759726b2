//! Client configuration parsed from environment variables.

use std::time::Duration;

use crate::locale::Locale;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("missing config: env var {var} not set")]
    Missing { var: &'static str },

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            connect: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
    pub locale: Locale,
    pub timezone: String,
}

impl ClientConfig {
    /// Config with defaults for everything but the base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeouts: Timeouts::default(),
            locale: Locale::default(),
            timezone: DEFAULT_TIMEZONE.to_owned(),
        }
    }

    /// Build typed client config from environment variables.
    ///
    /// Required:
    /// - `CLIENTDESK_BASE_URL`
    ///
    /// Optional:
    /// - `CLIENTDESK_TIMEOUT_MS`: default 5000
    /// - `CLIENTDESK_CONNECT_TIMEOUT_MS`: default 5000
    /// - `CLIENTDESK_LOCALE`: `ru` (default) or `en`
    /// - `CLIENTDESK_TIMEZONE`: falls back to `TZ`, then `UTC`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is missing or the locale is unknown.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url =
            std::env::var("CLIENTDESK_BASE_URL").map_err(|_| ConfigError::Missing { var: "CLIENTDESK_BASE_URL" })?;
        if base_url.trim().is_empty() {
            return Err(ConfigError::Parse("CLIENTDESK_BASE_URL is empty".into()));
        }

        let locale = match std::env::var("CLIENTDESK_LOCALE").ok() {
            Some(raw) => raw
                .parse::<Locale>()
                .map_err(|_| ConfigError::Parse(format!("unknown CLIENTDESK_LOCALE: {raw}")))?,
            None => Locale::default(),
        };

        let timezone = std::env::var("CLIENTDESK_TIMEZONE")
            .or_else(|_| std::env::var("TZ"))
            .ok()
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_owned());

        let timeouts = Timeouts {
            request: Duration::from_millis(env_parse("CLIENTDESK_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)),
            connect: Duration::from_millis(env_parse("CLIENTDESK_CONNECT_TIMEOUT_MS", DEFAULT_CONNECT_TIMEOUT_MS)),
        };

        Ok(Self { base_url: normalize_base_url(&base_url), timeouts, locale, timezone })
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
