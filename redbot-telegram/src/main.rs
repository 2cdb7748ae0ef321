//! Binary for the red.cl prediction Telegram bot.

use std::sync::Arc;

use anyhow::Result;
use redbot_core::{init_tracing, Bot, PredictionSource};
use redbot_handlers::PredictionHandler;
use redbot_red::RedClient;
use redbot_session::PollController;
use redbot_telegram::{run_repl, TelegramBotAdapter, TelegramConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = TelegramConfig::from_env()?;
    init_tracing(config.log_file.as_deref())?;

    let bot = teloxide::Bot::new(config.bot_token.clone());
    let sender: Arc<dyn Bot> = Arc::new(TelegramBotAdapter::new(bot.clone()));
    let source: Arc<dyn PredictionSource> =
        Arc::new(RedClient::new(config.token_url, config.prediction_url)?);

    let controller = Arc::new(PollController::new(source, sender));
    let handler = Arc::new(PredictionHandler::new(controller));

    info!("Bot is now running");
    run_repl(bot, handler).await
}
