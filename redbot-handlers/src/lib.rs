//! # redbot-handlers
//!
//! Command surface: parses the bot commands out of inbound messages and
//! dispatches them to the [`PollController`], mapping every controller
//! outcome to its reply text. Non-command text is passed through untouched.

mod command;
mod prediction_handler;

pub use command::{parse_command, Command};
pub use prediction_handler::{
    PredictionHandler, ALREADY_RUNNING_REPLY, CANCELLING_REPLY, INVALID_DURATION_REPLY,
    INVALID_INTERVAL_REPLY, MISSING_CODE_REPLY, MISSING_DEFAULT_CODE_REPLY, NOTHING_RUNNING_REPLY,
    NO_CREDENTIAL_REPLY,
};
