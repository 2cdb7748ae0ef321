//! REPL runner: converts teloxide messages to core Messages, runs the
//! handler in a spawned task, and sends any reply back to the chat.

use std::sync::Arc;

use anyhow::Result;
use redbot_core::{Bot as CoreBot, Handler, HandlerResponse, ToCoreMessage};
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use crate::adapters::TelegramMessageWrapper;
use crate::bot_adapter::TelegramBotAdapter;

/// Starts the REPL with the given teloxide Bot and handler. Each text
/// message is converted to a core Message and handled in a spawned task so
/// the REPL returns immediately; a [`HandlerResponse::Reply`] is sent back
/// to the originating chat.
#[instrument(skip(bot, handler))]
pub async fn run_repl(bot: teloxide::Bot, handler: Arc<dyn Handler>) -> Result<()> {
    let sender: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(bot.clone()));

    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let handler = handler.clone();
        let sender = sender.clone();

        async move {
            if msg.text().is_none() {
                return Ok(());
            }
            let core_msg = TelegramMessageWrapper(&msg).to_core();
            info!(
                user_id = core_msg.user.id,
                chat_id = core_msg.chat.id,
                message_content = %core_msg.content,
                "Received message"
            );

            tokio::spawn(async move {
                match handler.handle(&core_msg).await {
                    Ok(HandlerResponse::Reply(text)) => {
                        if let Err(e) = sender.send_message(&core_msg.chat, &text).await {
                            error!(error = %e, chat_id = core_msg.chat.id, "Failed to send reply");
                        }
                    }
                    Ok(HandlerResponse::Continue) => {}
                    Err(e) => {
                        error!(error = %e, user_id = core_msg.user.id, "Handler failed");
                    }
                }
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}
