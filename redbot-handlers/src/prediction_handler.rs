//! Handler that maps commands to controller calls and outcomes to replies.

use std::sync::Arc;

use async_trait::async_trait;
use redbot_core::{Handler, HandlerResponse, Message, Result};
use redbot_session::{CancelOutcome, PollController, StartOutcome};
use tracing::{info, instrument};

use crate::command::{parse_command, Command};

pub const ALREADY_RUNNING_REPLY: &str = "⚠️ Prediction updates are already running!";
pub const NO_CREDENTIAL_REPLY: &str = "🚫 Couldn't get a token from red.cl";
pub const MISSING_CODE_REPLY: &str =
    "⚠️ A stop code must be provided, or set one first: /default_code PI445";
pub const CANCELLING_REPLY: &str = "❗️ Cancelling prediction updates...";
pub const NOTHING_RUNNING_REPLY: &str = "⚠️ No prediction updates are currently running.";
pub const MISSING_DEFAULT_CODE_REPLY: &str = "❌ A stop code must be provided";
pub const INVALID_INTERVAL_REPLY: &str = "❌ An invalid interval has been provided";
pub const INVALID_DURATION_REPLY: &str = "❌ An invalid duration has been provided";

/// Dispatches prediction commands to the [`PollController`]. Every command
/// yields exactly one reply; anything else returns Continue.
pub struct PredictionHandler {
    controller: Arc<PollController>,
}

impl PredictionHandler {
    pub fn new(controller: Arc<PollController>) -> Self {
        Self { controller }
    }

    async fn start(&self, message: &Message, code: Option<&str>) -> String {
        match self.controller.start(&message.chat, code).await {
            StartOutcome::Started {
                stop_code,
                interval_seconds,
                duration_minutes,
            } => format!(
                "✅ Starting predictions for stop {stop_code}: every {interval_seconds} seconds for {duration_minutes} minutes"
            ),
            StartOutcome::AlreadyRunning => ALREADY_RUNNING_REPLY.to_string(),
            StartOutcome::NoCredential => NO_CREDENTIAL_REPLY.to_string(),
            StartOutcome::MissingCode => MISSING_CODE_REPLY.to_string(),
        }
    }

    async fn stop(&self, message: &Message) -> String {
        match self.controller.cancel(message.chat.id).await {
            CancelOutcome::Cancelled => CANCELLING_REPLY.to_string(),
            CancelOutcome::NothingRunning => NOTHING_RUNNING_REPLY.to_string(),
        }
    }

    async fn set_default_code(&self, message: &Message, code: Option<&str>) -> String {
        match code {
            Some(code) => {
                self.controller.set_default_code(&message.chat, code).await;
                format!("✅ Default stop code set to {code}")
            }
            None => MISSING_DEFAULT_CODE_REPLY.to_string(),
        }
    }

    async fn set_default_interval(&self, message: &Message, value: Option<&str>) -> String {
        match parse_positive(value) {
            Some(seconds) => {
                self.controller
                    .set_default_interval(&message.chat, seconds)
                    .await;
                format!("✅ Default interval set to {seconds} seconds")
            }
            None => INVALID_INTERVAL_REPLY.to_string(),
        }
    }

    async fn set_default_duration(&self, message: &Message, value: Option<&str>) -> String {
        match parse_positive(value) {
            Some(minutes) => {
                self.controller
                    .set_default_duration(&message.chat, minutes)
                    .await;
                format!("✅ Default duration set to {minutes} minutes")
            }
            None => INVALID_DURATION_REPLY.to_string(),
        }
    }

    async fn info(&self, message: &Message) -> String {
        let info = self.controller.info(&message.chat).await;
        let code = info.default_code.as_deref().unwrap_or("not set");
        let running = match info.running_stop_code.as_deref() {
            Some(stop_code) => format!("yes (stop {stop_code})"),
            None => "no".to_string(),
        };
        format!(
            "ℹ️ Default stop code: {code}; interval: {} seconds; duration: {} minutes; running: {running}",
            info.interval_seconds, info.duration_minutes
        )
    }

    fn hello(&self, message: &Message) -> String {
        let name = message
            .user
            .first_name
            .as_deref()
            .unwrap_or("there");
        format!("Hello {name}")
    }
}

/// Parses a strictly positive integer; zero and garbage both fail.
fn parse_positive(value: Option<&str>) -> Option<u64> {
    value?.parse().ok().filter(|v| *v > 0)
}

#[async_trait]
impl Handler for PredictionHandler {
    #[instrument(skip(self, message), fields(chat_id = message.chat.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        let command = match parse_command(&message.content) {
            Some(command) => command,
            None => return Ok(HandlerResponse::Continue),
        };
        info!(command = ?command, "Dispatching command");

        let reply = match command {
            Command::Start { code } => self.start(message, code).await,
            Command::Stop => self.stop(message).await,
            Command::DefaultCode { code } => self.set_default_code(message, code).await,
            Command::DefaultInterval { value } => self.set_default_interval(message, value).await,
            Command::DefaultDuration { value } => self.set_default_duration(message, value).await,
            Command::Info => self.info(message).await,
            Command::Hello => self.hello(message),
        };

        Ok(HandlerResponse::Reply(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::parse_positive;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(Some("30")), Some(30));
        assert_eq!(parse_positive(Some("1")), Some(1));
        assert_eq!(parse_positive(Some("0")), None);
        assert_eq!(parse_positive(Some("-5")), None);
        assert_eq!(parse_positive(Some("abc")), None);
        assert_eq!(parse_positive(None), None);
    }
}
