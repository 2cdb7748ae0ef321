//! Minimal env config: bot token, red.cl URLs, log path.

use anyhow::Result;
use std::env;

/// Configuration loaded from the environment. `BOT_TOKEN` is required;
/// `TOKEN_URL` and `PREDICTION_URL` override the red.cl defaults; `LOG_FILE`
/// additionally tees the tracing output to a file.
pub struct TelegramConfig {
    pub bot_token: String,
    pub token_url: Option<String>,
    pub prediction_url: Option<String>,
    pub log_file: Option<String>,
}

impl TelegramConfig {
    /// Loads from environment variables. Call dotenvy::dotenv() first so a
    /// .env file is honored.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?;
        let token_url = env::var("TOKEN_URL").ok();
        let prediction_url = env::var("PREDICTION_URL").ok();
        let log_file = env::var("LOG_FILE").ok();
        Ok(Self {
            bot_token,
            token_url,
            prediction_url,
            log_file,
        })
    }

    /// Constructs with the given token; everything else defaults.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            token_url: None,
            prediction_url: None,
            log_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_token() {
        let config = TelegramConfig::with_token("test_token".to_string());
        assert_eq!(config.bot_token, "test_token");
        assert!(config.token_url.is_none());
        assert!(config.prediction_url.is_none());
        assert!(config.log_file.is_none());
    }
}
