use crate::{env_or_default, env_parse, ConfigError, FromEnv};
use std::time::Duration;

/// Lviv regional power company feed (Lviv city, community 28)
pub const DEFAULT_OUTAGE_API_URL: &str =
    "https://power-api.loe.lviv.ua/api/pw_accidents?pagination=false&otg.id=28&city.id=693";

/// Outage feed endpoint configuration
#[derive(Clone, Debug)]
pub struct OutageFeedConfig {
    pub url: String,
    pub timeout: Duration,
}

impl OutageFeedConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for OutageFeedConfig {
    fn default() -> Self {
        Self::new(DEFAULT_OUTAGE_API_URL.to_string())
    }
}

impl FromEnv for OutageFeedConfig {
    /// Reads OUTAGE_API_URL and OUTAGE_API_TIMEOUT_SECS (default 30)
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_or_default("OUTAGE_API_URL", DEFAULT_OUTAGE_API_URL);
        let timeout_secs: u64 = env_parse("OUTAGE_API_TIMEOUT_SECS", 30)?;

        Ok(Self {
            url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
