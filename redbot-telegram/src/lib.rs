//! # redbot-telegram
//!
//! Telegram layer: adapters from teloxide types to core types, the
//! [`redbot_core::Bot`] implementation, minimal env config, and the REPL
//! runner. Handles only Telegram connectivity; all prediction logic lives in
//! redbot-session and redbot-handlers.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use runner::run_repl;
