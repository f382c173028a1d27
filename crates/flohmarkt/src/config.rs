use std::time::Duration;

use chrono_tz::Tz;

use crate::geo::Coordinates;

pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// Run-wide settings shared by the resolvers, the aggregator and the HTTP clients.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the reference point, used in the digest header.
    pub reference_name: String,
    pub reference: Coordinates,
    /// Inclusive radius around `reference`.
    pub radius_km: f64,
    pub timezone: Tz,
    pub user_agent: String,
    pub fetch_timeout: Duration,
    pub send_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_name: "Bochum".to_string(),
            reference: Coordinates::new(51.4818, 7.2162),
            radius_km: 80.0,
            timezone: chrono_tz::Europe::Berlin,
            user_agent: "Mozilla/5.0 (compatible; FlohScanner/1.0)".to_string(),
            fetch_timeout: Duration::from_secs(25),
            send_timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds credentials from an arbitrary variable source. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVar(name))
        };

        Ok(Self {
            bot_token: read(BOT_TOKEN_VAR)?,
            chat_id: read(CHAT_ID_VAR)?,
        })
    }
}
