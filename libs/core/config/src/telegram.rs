use crate::{env_or_default, env_required, ConfigError, FromEnv};

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Telegram Bot API configuration
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
}

impl TelegramConfig {
    pub fn new(token: String) -> Self {
        Self {
            token,
            api_url: DEFAULT_TELEGRAM_API_URL.to_string(),
        }
    }
}

// The token never reaches the logs.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl FromEnv for TelegramConfig {
    /// Requires TELEGRAM_BOT_TOKEN; TELEGRAM_API_URL is optional
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            token: env_required("TELEGRAM_BOT_TOKEN")?,
            api_url: env_or_default("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL),
        })
    }
}
